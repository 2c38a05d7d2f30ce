//! # Transaction Envelope
//!
//! [`Transaction`] owns one [`TxData`] payload plus every cache derived from
//! it. Envelopes are shared across threads behind `Arc`; all caches fill on
//! first demand through `&self`.
//!
//! ## Caches
//!
//! | Field | Kind | Filled by |
//! |-------|------|-----------|
//! | `hash`, `size`, `sender_tx_hash` | `OnceLock` | first call |
//! | `from`, `sender_pubkeys`, `fee_payer_pubkeys` | `RwLock<Option<(SignerId, _)>>` | recovery, hit only for an equal signer |
//! | `validated` | `RwLock` | [`Transaction::as_message_with_account_key_picker`] |
//! | `marked_unexecutable` | `AtomicBool` | block validation |
//!
//! Mutating the payload through `&mut self` drops every cache.

use crate::config::ForkRules;
use crate::domain::{
    AccessList, AccountKeyType, FeeDelegation, LegacyTx, NativeBody, RoleType, TxData, TxError,
    TxInternalData, TxResult, TxSignature, TxSignatures, TxType, MAX_FEE_RATIO,
};
use crate::ports::{AccountKeyPicker, AccountRef, CallOutput, StateDb, Vm};
use crate::signer::{SignerId, TxSigner};
use parking_lot::RwLock;
use rlp::RlpStream;
use shared_crypto::{Secp256k1KeyPair, Secp256k1PublicKey};
use shared_types::{keccak256, Address, Hash, RlpReader, StorageSize, U256};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, trace};

/// Fields settled by sender and fee payer validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Validated {
    pub sender: Address,
    pub fee_payer: Address,
    pub intrinsic_gas: u64,
    /// The account nonce is checked only when set.
    pub check_nonce: bool,
}

type PubkeyCache = RwLock<Option<(SignerId, Vec<Secp256k1PublicKey>)>>;

pub struct Transaction {
    data: TxData,
    time: Instant,

    hash: OnceLock<Hash>,
    size: OnceLock<StorageSize>,
    sender_tx_hash: OnceLock<Hash>,
    pub(crate) from: RwLock<Option<(SignerId, Address)>>,
    pub(crate) sender_pubkeys: PubkeyCache,
    pub(crate) fee_payer_pubkeys: PubkeyCache,

    validated: RwLock<Validated>,
    marked_unexecutable: AtomicBool,
}

impl Transaction {
    pub fn new(data: TxData) -> Self {
        Self {
            data,
            time: Instant::now(),
            hash: OnceLock::new(),
            size: OnceLock::new(),
            sender_tx_hash: OnceLock::new(),
            from: RwLock::new(None),
            sender_pubkeys: RwLock::new(None),
            fee_payer_pubkeys: RwLock::new(None),
            validated: RwLock::new(Validated::default()),
            marked_unexecutable: AtomicBool::new(false),
        }
    }

    /// Legacy value transfer or call.
    pub fn new_transaction(
        nonce: u64,
        to: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Vec<u8>,
    ) -> Self {
        Self::new(TxData::Legacy(LegacyTx::new(
            nonce,
            Some(to),
            amount,
            gas_limit,
            gas_price,
            data,
        )))
    }

    /// Legacy contract creation.
    pub fn new_contract_creation(
        nonce: u64,
        amount: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Vec<u8>,
    ) -> Self {
        Self::new(TxData::Legacy(LegacyTx::new(
            nonce, None, amount, gas_limit, gas_price, data,
        )))
    }

    /// A pre-validated legacy call, used by simulation paths.
    #[allow(clippy::too_many_arguments)]
    pub fn new_message(
        from: Address,
        to: Option<Address>,
        nonce: u64,
        amount: U256,
        gas_limit: u64,
        gas_price: U256,
        data: Vec<u8>,
        check_nonce: bool,
        intrinsic_gas: u64,
    ) -> Self {
        let tx = Self::new(TxData::Legacy(LegacyTx::new(
            nonce, to, amount, gas_limit, gas_price, data,
        )));
        *tx.validated.write() = Validated {
            sender: from,
            fee_payer: from,
            intrinsic_gas,
            check_nonce,
        };
        tx
    }

    fn reset_caches(&mut self) {
        self.hash = OnceLock::new();
        self.size = OnceLock::new();
        self.sender_tx_hash = OnceLock::new();
        *self.from.get_mut() = None;
        *self.sender_pubkeys.get_mut() = None;
        *self.fee_payer_pubkeys.get_mut() = None;
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Canonical wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.data.encode()
    }

    /// Decodes one transaction; the size cache is primed with the input length.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let tx = Self::new(TxData::decode(bytes)?);
        let _ = tx.size.set(bytes.len());
        Ok(tx)
    }

    /// Decodes the transaction at the reader's cursor, as found in block bodies.
    pub fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let start = reader.position();
        let tx = Self::new(TxData::decode_from(reader)?);
        let _ = tx.size.set(reader.position() - start);
        Ok(tx)
    }

    /// Appends the wire items to an enclosing list.
    pub fn rlp_append_to(&self, s: &mut RlpStream) {
        s.append_raw(&self.encode(), self.data.item_count());
    }

    /// Number of items [`Transaction::rlp_append_to`] contributes to a list.
    pub fn item_count(&self) -> usize {
        self.data.item_count()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn data(&self) -> &TxData {
        &self.data
    }

    pub fn inner(&self) -> &dyn TxInternalData {
        self.data.inner()
    }

    pub fn tx_type(&self) -> TxType {
        self.inner().tx_type()
    }

    pub fn is_legacy(&self) -> bool {
        self.tx_type().is_legacy()
    }

    pub fn is_eth_typed(&self) -> bool {
        self.tx_type().is_eth_typed()
    }

    pub fn is_ethereum(&self) -> bool {
        self.tx_type().is_ethereum()
    }

    pub fn is_fee_delegated(&self) -> bool {
        self.data.fee_delegation().is_some()
    }

    pub fn chain_id(&self) -> U256 {
        self.inner().chain_id()
    }

    pub fn nonce(&self) -> u64 {
        self.inner().nonce()
    }

    pub fn gas(&self) -> u64 {
        self.inner().gas_limit()
    }

    pub fn gas_price(&self) -> U256 {
        self.inner().price()
    }

    pub fn value(&self) -> U256 {
        self.inner().amount()
    }

    pub fn payload(&self) -> &[u8] {
        self.inner().payload()
    }

    pub fn to(&self) -> Option<Address> {
        self.inner().recipient()
    }

    /// Declared sender; Ethereum-family transactions have none.
    pub fn from(&self) -> TxResult<Address> {
        self.inner().from()
    }

    /// The declared fee payer, or the sender when not delegated.
    pub fn fee_payer(&self) -> TxResult<Address> {
        match self.data.fee_delegation() {
            Some(fd) => Ok(fd.fee_payer),
            None => self.from(),
        }
    }

    /// Percentage of the fee the fee payer bears.
    pub fn fee_ratio(&self) -> u8 {
        match &self.data {
            TxData::Native(tx) => tx.fee_ratio().map_or(MAX_FEE_RATIO, |ratio| ratio.get()),
            _ => MAX_FEE_RATIO,
        }
    }

    pub fn access_list(&self) -> Option<&AccessList> {
        match &self.data {
            TxData::AccessList(tx) => Some(&tx.access_list),
            TxData::DynamicFee(tx) => Some(&tx.access_list),
            _ => None,
        }
    }

    pub fn gas_tip_cap(&self) -> U256 {
        match &self.data {
            TxData::DynamicFee(tx) => tx.gas_tip_cap,
            _ => self.gas_price(),
        }
    }

    pub fn gas_fee_cap(&self) -> U256 {
        match &self.data {
            TxData::DynamicFee(tx) => tx.gas_fee_cap,
            _ => self.gas_price(),
        }
    }

    /// Miner tip under `base_fee`; `None` when the fee cap is below it.
    pub fn effective_gas_tip(&self, base_fee: &U256) -> Option<U256> {
        match &self.data {
            TxData::DynamicFee(tx) => tx.effective_gas_tip(base_fee),
            _ => Some(self.gas_price()),
        }
    }

    pub fn effective_gas_price(&self, base_fee: &U256) -> U256 {
        match &self.data {
            TxData::DynamicFee(tx) => tx.effective_gas_price(base_fee),
            _ => self.gas_price(),
        }
    }

    /// `price * gas`.
    pub fn fee(&self) -> U256 {
        self.gas_price().saturating_mul(U256::from(self.gas()))
    }

    /// `fee + value`.
    pub fn cost(&self) -> U256 {
        self.fee().saturating_add(self.value())
    }

    /// Payload of a chain data anchoring transaction.
    pub fn anchored_data(&self) -> TxResult<&[u8]> {
        match &self.data {
            TxData::Native(tx) => match &tx.body {
                NativeBody::ChainDataAnchoring { payload } => Ok(payload),
                _ => Err(TxError::InvalidTxTypeForAnchoredData),
            },
            _ => Err(TxError::InvalidTxTypeForAnchoredData),
        }
    }

    pub fn role_type_for_validation(&self) -> RoleType {
        self.inner().role_type()
    }

    pub fn raw_signature_values(&self) -> TxSignatures {
        self.inner().signatures()
    }

    pub fn fee_payer_signatures(&self) -> TxResult<TxSignatures> {
        self.data
            .fee_delegation()
            .map(|fd| fd.fee_payer_signatures.clone())
            .ok_or(TxError::NotFeeDelegationTransaction)
    }

    /// When the transaction was created or received.
    pub fn time(&self) -> Instant {
        self.time
    }

    pub fn set_time(&mut self, time: Instant) {
        self.time = time;
    }

    /// Address a successful execution by `from` deploys, if any.
    pub fn contract_address(&self, from: &Address) -> Option<Address> {
        self.inner().contract_address(from)
    }

    pub fn rpc_output(&self) -> serde_json::Map<String, serde_json::Value> {
        self.inner().rpc_output()
    }

    // =========================================================================
    // Hashes
    // =========================================================================

    /// Transaction hash; identifies the transaction.
    pub fn hash(&self) -> Hash {
        *self.hash.get_or_init(|| {
            if self.is_eth_typed() {
                self.inner().sender_tx_hash()
            } else {
                keccak256(&self.encode())
            }
        })
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> StorageSize {
        *self.size.get_or_init(|| self.encode().len())
    }

    /// Hash of the sender-signed part, for fee-delegated transactions only.
    pub fn sender_tx_hash(&self) -> Option<Hash> {
        if !self.is_fee_delegated() {
            return None;
        }
        Some(self.sender_tx_hash_all())
    }

    /// Sender tx hash for every type; equals the hash when not delegated.
    pub fn sender_tx_hash_all(&self) -> Hash {
        *self
            .sender_tx_hash
            .get_or_init(|| self.inner().sender_tx_hash())
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    pub fn set_signatures(&mut self, signatures: TxSignatures) {
        self.data.inner_mut().set_signatures(signatures);
        self.reset_caches();
    }

    pub fn set_fee_payer_signatures(&mut self, signatures: TxSignatures) -> TxResult<()> {
        let fee_delegation: &mut FeeDelegation = self
            .data
            .fee_delegation_mut()
            .ok_or(TxError::NotFeeDelegationTransaction)?;
        fee_delegation.fee_payer_signatures = signatures;
        self.reset_caches();
        Ok(())
    }

    /// Typed transactions adopt the signer's chain id.
    fn adopt_chain_id(&mut self, signer: &dyn TxSigner) {
        match &mut self.data {
            TxData::AccessList(tx) => tx.chain_id = signer.chain_id(),
            TxData::DynamicFee(tx) => tx.chain_id = signer.chain_id(),
            _ => {}
        }
    }

    fn signatures_for(
        &self,
        signer: &dyn TxSigner,
        hash: &Hash,
        keys: &[&Secp256k1KeyPair],
    ) -> TxResult<TxSignatures> {
        keys.iter()
            .map(|key| {
                let sig = key.sign_prehash(hash)?;
                signer.signature_values(&self.data, &sig)
            })
            .collect::<TxResult<Vec<TxSignature>>>()
            .map(TxSignatures::new)
    }

    /// A copy carrying `sig` (`[R || S || recid]`) as its only sender signature.
    pub fn with_signature(
        &self,
        signer: &dyn TxSigner,
        sig: &shared_crypto::Secp256k1Signature,
    ) -> TxResult<Self> {
        let values = signer.signature_values(&self.data, sig)?;
        let mut copy = Self::new(self.data.clone());
        copy.time = self.time;
        copy.adopt_chain_id(signer);
        copy.set_signatures(TxSignatures::single(values));
        Ok(copy)
    }

    /// A copy carrying `sig` as its only fee payer signature.
    pub fn with_fee_payer_signature(
        &self,
        signer: &dyn TxSigner,
        sig: &shared_crypto::Secp256k1Signature,
    ) -> TxResult<Self> {
        let values = signer.signature_values(&self.data, sig)?;
        let mut copy = Self::new(self.data.clone());
        copy.time = self.time;
        copy.set_fee_payer_signatures(TxSignatures::single(values))?;
        Ok(copy)
    }

    pub fn sign(&mut self, signer: &dyn TxSigner, key: &Secp256k1KeyPair) -> TxResult<()> {
        self.sign_with_keys(signer, &[key])
    }

    pub fn sign_with_keys(
        &mut self,
        signer: &dyn TxSigner,
        keys: &[&Secp256k1KeyPair],
    ) -> TxResult<()> {
        let hash = signer.hash(&self.data);
        let signatures = self.signatures_for(signer, &hash, keys)?;
        self.set_signatures(signatures);
        Ok(())
    }

    pub fn sign_fee_payer(&mut self, signer: &dyn TxSigner, key: &Secp256k1KeyPair) -> TxResult<()> {
        self.sign_fee_payer_with_keys(signer, &[key])
    }

    pub fn sign_fee_payer_with_keys(
        &mut self,
        signer: &dyn TxSigner,
        keys: &[&Secp256k1KeyPair],
    ) -> TxResult<()> {
        let hash = signer.hash_fee_payer(&self.data)?;
        let signatures = self.signatures_for(signer, &hash, keys)?;
        self.set_fee_payer_signatures(signatures)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    pub fn intrinsic_gas(&self, rules: &ForkRules) -> TxResult<u64> {
        self.inner().intrinsic_gas(rules)
    }

    pub fn validate(&self, state: &dyn StateDb, block_number: u64) -> TxResult<()> {
        self.inner().validate(state, block_number)
    }

    /// Re-checks the validated sender and fee payer keys against current
    /// state, then the type-specific mutable rules.
    pub fn validate_mutable_value(
        &self,
        state: &dyn StateDb,
        signer: &dyn TxSigner,
        rules: &ForkRules,
        block_number: u64,
    ) -> TxResult<()> {
        let validated = self.validated();
        let key = state.get_key(&validated.sender);
        if self.is_ethereum() {
            if !key.key_type().is_legacy() {
                return Err(TxError::InvalidSigSender);
            }
        } else {
            let pubkeys = self
                .sender_pubkey(signer)
                .map_err(|_| TxError::InvalidSigSender)?;
            if !key.validate(rules, self.role_type_for_validation(), &pubkeys, &validated.sender) {
                return Err(TxError::InvalidSigSender);
            }
        }

        if self.is_fee_delegated() {
            let key = state.get_key(&validated.fee_payer);
            let pubkeys = self
                .sender_fee_payer_pubkey(signer)
                .map_err(|_| TxError::InvalidSigFeePayer)?;
            if !key.validate(rules, RoleType::FeePayer, &pubkeys, &validated.fee_payer) {
                return Err(TxError::InvalidSigFeePayer);
            }
        }

        self.inner().validate_mutable(state, block_number)
    }

    /// Establishes the sender; returns the key validation gas it costs.
    pub fn validate_sender(
        &self,
        signer: &dyn TxSigner,
        picker: &dyn AccountKeyPicker,
        rules: &ForkRules,
    ) -> TxResult<u64> {
        if self.is_ethereum() {
            let address = self.sender(signer)?;
            if picker.get_key(&address).key_type() != AccountKeyType::Legacy {
                return Err(TxError::LegacyTransactionMustBeWithLegacyKey);
            }
            let mut validated = self.validated.write();
            if validated.sender.is_zero() {
                validated.sender = address;
                validated.fee_payer = address;
            }
            return Ok(0);
        }

        let pubkeys = self.sender_pubkey(signer)?;
        let from = self.from()?;
        let key = picker.get_key(&from);
        let role = self.role_type_for_validation();
        let gas = key.sig_validation_gas(rules, role, pubkeys.len())?;
        if !key.validate(rules, role, &pubkeys, &from) {
            debug!(tx_hash = ?self.hash(), %from, "sender key rejected");
            return Err(TxError::InvalidSigSender);
        }

        let mut validated = self.validated.write();
        if validated.sender.is_zero() {
            validated.sender = from;
            validated.fee_payer = from;
        }
        Ok(gas)
    }

    /// Establishes the fee payer of a delegated transaction.
    pub fn validate_fee_payer(
        &self,
        signer: &dyn TxSigner,
        picker: &dyn AccountKeyPicker,
        rules: &ForkRules,
    ) -> TxResult<u64> {
        let fee_payer = self
            .data
            .fee_delegation()
            .map(|fd| fd.fee_payer)
            .ok_or(TxError::UndefinedTxType(self.tx_type().0))?;
        let pubkeys = self.sender_fee_payer_pubkey(signer)?;
        let key = picker.get_key(&fee_payer);
        let gas = key.sig_validation_gas(rules, RoleType::FeePayer, pubkeys.len())?;
        if !key.validate(rules, RoleType::FeePayer, &pubkeys, &fee_payer) {
            debug!(tx_hash = ?self.hash(), %fee_payer, "fee payer key rejected");
            return Err(TxError::InvalidSigFeePayer);
        }

        let mut validated = self.validated.write();
        if validated.fee_payer == validated.sender {
            validated.fee_payer = fee_payer;
        }
        Ok(gas)
    }

    /// Validates sender and fee payer and records the intrinsic gas
    /// execution will charge.
    pub fn as_message_with_account_key_picker(
        &self,
        signer: &dyn TxSigner,
        picker: &dyn AccountKeyPicker,
        rules: &ForkRules,
    ) -> TxResult<()> {
        if let TxData::Native(tx) = &self.data {
            if let Some(ratio) = tx.fee_ratio() {
                ratio.check()?;
            }
        }
        let intrinsic_gas = self.intrinsic_gas(rules)?;
        let sender_gas = self.validate_sender(signer, picker, rules)?;
        self.validated.write().check_nonce = true;

        let fee_payer_gas = if self.is_fee_delegated() {
            self.validate_fee_payer(signer, picker, rules)?
        } else {
            0
        };

        let total = intrinsic_gas
            .checked_add(sender_gas)
            .and_then(|gas| gas.checked_add(fee_payer_gas))
            .ok_or(TxError::OutOfGas)?;
        self.validated.write().intrinsic_gas = total;
        trace!(tx_hash = ?self.hash(), intrinsic_gas = total, "message validated");
        Ok(())
    }

    pub fn validated(&self) -> Validated {
        *self.validated.read()
    }

    pub fn validated_sender(&self) -> Address {
        self.validated.read().sender
    }

    pub fn validated_fee_payer(&self) -> Address {
        self.validated.read().fee_payer
    }

    pub fn validated_intrinsic_gas(&self) -> u64 {
        self.validated.read().intrinsic_gas
    }

    pub fn check_nonce(&self) -> bool {
        self.validated.read().check_nonce
    }

    pub fn mark_unexecutable(&self, unexecutable: bool) {
        self.marked_unexecutable.store(unexecutable, Ordering::Relaxed);
    }

    pub fn is_marked_unexecutable(&self) -> bool {
        self.marked_unexecutable.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Runs the type-specific state transition as the validated sender.
    pub fn execute(
        &self,
        vm: &mut dyn Vm,
        state: &mut dyn StateDb,
        block_number: u64,
        gas: u64,
        value: U256,
    ) -> TxResult<CallOutput> {
        let validated = self.validated();
        let sender = AccountRef::with_fee_payer(validated.sender, validated.fee_payer);
        self.inner()
            .execute(&sender, vm, state, block_number, gas, value)
    }
}

impl Clone for Transaction {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            time: self.time,
            hash: self.hash.clone(),
            size: self.size.clone(),
            sender_tx_hash: self.sender_tx_hash.clone(),
            from: RwLock::new(self.from.read().clone()),
            sender_pubkeys: RwLock::new(self.sender_pubkeys.read().clone()),
            fee_payer_pubkeys: RwLock::new(self.fee_payer_pubkeys.read().clone()),
            validated: RwLock::new(self.validated()),
            marked_unexecutable: AtomicBool::new(self.is_marked_unexecutable()),
        }
    }
}

/// Payload equality; caches and timestamps are ignored.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Transaction {}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("type", &self.tx_type().name())
            .field("hash", &self.hash())
            .field("data", &self.data)
            .finish()
    }
}

impl From<TxData> for Transaction {
    fn from(data: TxData) -> Self {
        Self::new(data)
    }
}

/// Signs `tx` as its sender and returns the signed copy.
pub fn sign_tx(
    tx: &Transaction,
    signer: &dyn TxSigner,
    key: &Secp256k1KeyPair,
) -> TxResult<Transaction> {
    let sig = key.sign_prehash(&signer.hash(tx.data()))?;
    tx.with_signature(signer, &sig)
}

/// Signs `tx` as its fee payer and returns the signed copy.
pub fn sign_tx_as_fee_payer(
    tx: &Transaction,
    signer: &dyn TxSigner,
    key: &Secp256k1KeyPair,
) -> TxResult<Transaction> {
    let sig = key.sign_prehash(&signer.hash_fee_payer(tx.data())?)?;
    tx.with_fee_payer_signature(signer, &sig)
}
