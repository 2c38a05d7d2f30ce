//! Shared helpers for the suite and the benches.

use kc_transactions::{
    sign_tx, AccountKey, AccountKeyPicker, NativeBody, NativeTx, Transaction, TxSigner,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, U256};
use std::collections::HashMap;
use std::sync::Arc;

/// Chain id used throughout the suite.
pub const CHAIN_ID: u64 = 2018;

/// In-memory key registry.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: HashMap<Address, AccountKey>,
}

impl KeyRegistry {
    pub fn with_key(mut self, address: Address, key: AccountKey) -> Self {
        self.keys.insert(address, key);
        self
    }
}

impl AccountKeyPicker for KeyRegistry {
    fn get_key(&self, address: &Address) -> AccountKey {
        self.keys.get(address).cloned().unwrap_or_default()
    }

    fn exist(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }
}

/// A legacy transfer signed by `key`.
pub fn signed_legacy(
    key: &Secp256k1KeyPair,
    signer: &dyn TxSigner,
    nonce: u64,
    price: u64,
) -> Arc<Transaction> {
    let tx = Transaction::new_transaction(
        nonce,
        Address::repeat_byte(0xde),
        U256::one(),
        21_000,
        U256::from(price),
        vec![],
    );
    Arc::new(sign_tx(&tx, signer, key).expect("signing succeeds"))
}

/// A native value transfer from `key`'s address, signed by `key`.
pub fn signed_value_transfer(
    key: &Secp256k1KeyPair,
    signer: &dyn TxSigner,
    nonce: u64,
    price: u64,
) -> Arc<Transaction> {
    let tx = Transaction::new(kc_transactions::TxData::Native(NativeTx::new(
        nonce,
        U256::from(price),
        50_000,
        key.address(),
        NativeBody::ValueTransfer {
            to: Address::repeat_byte(0xaa),
            amount: U256::from(5u64),
        },
        None,
    )
    .expect("valid native tx")));
    Arc::new(sign_tx(&tx, signer, key).expect("signing succeeds"))
}

/// `count` keys derived from fixed secrets, so runs are reproducible.
pub fn keys(count: usize) -> Vec<Secp256k1KeyPair> {
    (0..count)
        .map(|i| {
            let mut secret = [0x11u8; 32];
            secret[..8].copy_from_slice(&(i as u64 + 1).to_be_bytes());
            Secp256k1KeyPair::from_bytes(secret).expect("valid secret")
        })
        .collect()
}
