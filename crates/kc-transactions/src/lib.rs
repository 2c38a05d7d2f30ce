//! # Transaction Core
//!
//! Klaytn-style transactions: the typed variant family, its consensus
//! encoding, signing and recovery, account keys and anchoring payloads.
//!
//! ## Transaction Family
//!
//! | Category | Tags | Payload |
//! |----------|------|---------|
//! | Legacy | none on the wire | [`LegacyTx`] |
//! | Ethereum typed | `0x78 0x01`, `0x78 0x02` | [`AccessListTx`], [`DynamicFeeTx`] |
//! | Native | `0x08`..`0x48` | [`NativeTx`] with a [`NativeBody`] |
//! | Fee delegated | native tag `+1`, `+2` with ratio | [`NativeTx`] with a [`FeeDelegation`] |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Decoded signatures are in range | `domain/tx_data.rs` - `check_signature_values()` |
//! | Typed chain id matches the signer | `signer.rs` - `typed_pubkey()` |
//! | Fee ratio in `1..=99` | `domain/fee.rs` - `FeeRatio::new()` |
//! | Ethereum-family senders hold a legacy key | `transaction.rs` - `validate_sender()` |
//! | Caches hit only for the signer that filled them | `sender.rs` - `cached()` |
//!
//! ## Module Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  transaction.rs - Transaction envelope, caches, validation      │
//! │  sender.rs      - memoized sender / fee payer recovery          │
//! │  recovery.rs    - rayon batch recovery                          │
//! │  rpc.rs         - JSON projection and codec                     │
//! │  value_map.rs   - construction from keyed values                │
//! │  signer.rs      - EIP-155 / EIP-2930 / London signers           │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↓ uses ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/outbound.rs - StateDb, AccountKeyPicker, Vm              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↓ uses ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/ - variants, account keys, signatures, gas, anchoring   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod params;
pub mod ports;
pub mod recovery;
pub mod rpc;
pub mod sender;
pub mod signer;
pub mod transaction;
pub mod value_map;

pub use config::{ForkRules, ProtocolConfig};
pub use domain::*;
pub use params::CodeFormat;
pub use ports::{
    AccountKeyPicker, AccountRef, CallOutput, ContractRef, CreateOutput, StateDb, Vm,
};
pub use recovery::{recover_senders, recover_senders_sequential};
pub use signer::{
    latest_signer_for_chain_id, Eip155Signer, Eip2930Signer, LondonSigner, SignerId, SignerKind,
    TxSigner,
};
pub use transaction::{sign_tx, sign_tx_as_fee_payer, Transaction, Validated};
pub use value_map::{TxValue, TxValueKey, TxValueMap};
