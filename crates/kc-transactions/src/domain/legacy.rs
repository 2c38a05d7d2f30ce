//! Ethereum legacy transactions.
//!
//! Wire form is a flat list `[nonce, price, gas, to, value, data, V, R, S]`
//! with no tag byte.

use super::errors::{TxError, TxResult};
use super::gas::ethereum_intrinsic_gas;
use super::signature::{TxSignature, TxSignatures};
use super::tx_data::{precompiled_recipient_check, rpc_common, TxInternalData};
use super::tx_type::TxType;
use crate::config::ForkRules;
use crate::params::CodeFormat;
use crate::ports::{CallOutput, ContractRef, StateDb, Vm};
use rlp::RlpStream;
use shared_types::codec::append_optional_address;
use shared_types::{keccak256, to_hex, u256_to_hex, Address, Hash, RlpReader, U256};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyTx {
    pub nonce: u64,
    pub price: U256,
    pub gas: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    pub amount: U256,
    pub payload: Vec<u8>,
    pub signature: TxSignature,
}

impl LegacyTx {
    pub fn new(
        nonce: u64,
        to: Option<Address>,
        amount: U256,
        gas: u64,
        price: U256,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            nonce,
            price,
            gas,
            to,
            amount,
            payload,
            signature: TxSignature::default(),
        }
    }

    pub(crate) fn decode_body(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        reader.list_header()?;
        let nonce = reader.decode_next()?;
        let price = reader.decode_next()?;
        let gas = reader.decode_next()?;
        let to = reader.decode_next_optional_address()?;
        let amount = reader.decode_next()?;
        let payload = reader.decode_next()?;
        let signature = TxSignature::new(
            reader.decode_next()?,
            reader.decode_next()?,
            reader.decode_next()?,
        );
        reader.list_end()?;
        Ok(Self {
            signature,
            ..Self::new(nonce, to, amount, gas, price, payload)
        })
    }

    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.price);
        s.append(&self.gas);
        append_optional_address(s, &self.to);
        s.append(&self.amount);
        s.append(&self.payload);
    }
}

impl TxInternalData for LegacyTx {
    fn tx_type(&self) -> TxType {
        TxType::LEGACY
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn price(&self) -> U256 {
        self.price
    }

    fn gas_limit(&self) -> u64 {
        self.gas
    }

    fn recipient(&self) -> Option<Address> {
        self.to
    }

    fn amount(&self) -> U256 {
        self.amount
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn from(&self) -> TxResult<Address> {
        Err(TxError::LegacyTransaction)
    }

    fn signatures(&self) -> TxSignatures {
        TxSignatures::single(self.signature.clone())
    }

    fn set_signatures(&mut self, signatures: TxSignatures) {
        if let Some(first) = signatures.0.into_iter().next() {
            self.signature = first;
        }
    }

    fn chain_id(&self) -> U256 {
        self.signature.chain_id()
    }

    fn intrinsic_gas(&self, rules: &ForkRules) -> TxResult<u64> {
        ethereum_intrinsic_gas(&self.payload, None, self.to.is_none(), rules)
    }

    fn serialize_for_sign(&self) -> Vec<Vec<u8>> {
        let mut items = Vec::with_capacity(6);
        items.push(rlp::encode(&self.nonce).to_vec());
        items.push(rlp::encode(&self.price).to_vec());
        items.push(rlp::encode(&self.gas).to_vec());
        let mut to = RlpStream::new();
        append_optional_address(&mut to, &self.to);
        items.push(to.out().to_vec());
        items.push(rlp::encode(&self.amount).to_vec());
        items.push(rlp::encode(&self.payload).to_vec());
        items
    }

    fn sender_tx_hash(&self) -> Hash {
        keccak256(&self.encode_body())
    }

    fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()> {
        if let Some(to) = &self.to {
            precompiled_recipient_check(to)?;
        }
        self.validate_mutable(state, block_number)
    }

    fn validate_mutable(&self, _state: &dyn StateDb, _block_number: u64) -> TxResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        sender: &dyn ContractRef,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        _block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput> {
        match &self.to {
            None => {
                let out = vm.create(sender, &self.payload, gas, value, CodeFormat::EVM)?;
                Ok(CallOutput {
                    ret: out.ret,
                    left_over_gas: out.left_over_gas,
                })
            }
            Some(to) => {
                state.inc_nonce(&sender.address());
                Ok(vm.call(sender, to, &self.payload, gas, value)?)
            }
        }
    }

    fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = rpc_common(self);
        map.insert("input".into(), to_hex(&self.payload).into());
        map.insert("to".into(), serde_json::json!(self.to));
        map.insert("value".into(), u256_to_hex(&self.amount).into());
        map
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        self.append_unsigned(&mut s);
        s.append(&self.signature.v);
        s.append(&self.signature.r);
        s.append(&self.signature.s);
        s.out().to_vec()
    }

    fn contract_address(&self, from: &Address) -> Option<Address> {
        match self.to {
            None => Some(shared_crypto::create_address(from, self.nonce)),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_unsigned_body_shape() {
        let tx = LegacyTx::new(
            9,
            Some(Address::from(hex!("3535353535353535353535353535353535353535"))),
            U256::from(1_000_000_000_000_000_000u64),
            21_000,
            U256::from(20_000_000_000u64),
            vec![],
        );
        // first six items of the EIP-155 example transaction
        let items = tx.serialize_for_sign();
        assert_eq!(items[0], vec![0x09]);
        assert_eq!(items[3].len(), 21);
        assert_eq!(items[5], vec![0x80]);
    }

    #[test]
    fn test_decode_body() {
        let mut tx = LegacyTx::new(1, None, U256::one(), 100_000, U256::zero(), vec![0x60, 0x00]);
        tx.set_signatures(TxSignatures::single(TxSignature::new(
            U256::from(37u64),
            U256::one(),
            U256::from(2u64),
        )));
        let bytes = tx.encode_body();
        let mut reader = RlpReader::new(&bytes);
        let decoded = LegacyTx::decode_body(&mut reader).unwrap();
        reader.finish().unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.recipient(), None);
        assert_eq!(decoded.chain_id(), U256::one());
    }

    #[test]
    fn test_from_is_unsupported() {
        let tx = LegacyTx::default();
        assert_eq!(tx.from(), Err(TxError::LegacyTransaction));
    }

    #[test]
    fn test_creation_gas() {
        let tx = LegacyTx::new(0, None, U256::zero(), 0, U256::zero(), vec![]);
        assert_eq!(tx.intrinsic_gas(&ForkRules::default()).unwrap(), 53_000);
    }
}
