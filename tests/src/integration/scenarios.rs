//! # Reference Scenarios
//!
//! | Test | Crates |
//! |------|--------|
//! | legacy sign and recover | kc-transactions, shared-crypto |
//! | dynamic fee pricing | kc-transactions |
//! | priority selector | kc-ordering |
//! | anchoring type 0 | kc-transactions |
//! | receipt for storage | kc-blocks |
//! | IBFT header hash | kc-blocks |

#[cfg(test)]
mod tests {
    use crate::fixtures::CHAIN_ID;
    use hex_literal::hex;
    use kc_blocks::{
        BlockConfig, EngineType, Header, Receipt, ReceiptForStorage, ReceiptStatus,
        ISTANBUL_EXTRA_VANITY,
    };
    use kc_ordering::TransactionsByPriceAndNonce;
    use kc_transactions::{
        decode_anchoring_data, sign_tx, AnchoringData, AnchoringDataInternal,
        AnchoringDataInternalType0, DynamicFeeTx, Eip155Signer, Transaction, TxData, TxError,
        TxType,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{decode, encode, keccak256, Address, Hash, U256};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Instant;

    // =========================================================================
    // Legacy sign / recover
    // =========================================================================

    #[test]
    fn test_legacy_sign_recover() {
        let key = Secp256k1KeyPair::generate();
        let signer = Eip155Signer::new(CHAIN_ID);
        let tx = Transaction::new_transaction(
            0,
            Address::from(hex!("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef")),
            U256::one(),
            100_000,
            U256::zero(),
            vec![],
        );
        let signed = sign_tx(&tx, &signer, &key).unwrap();

        assert_eq!(signed.sender(&signer).unwrap(), key.address());
        assert_eq!(signed.chain_id(), U256::from(CHAIN_ID));

        // The wire form carries the same signature.
        let decoded = Transaction::decode(&signed.encode()).unwrap();
        assert_eq!(decoded.sender(&signer).unwrap(), key.address());
        assert_eq!(decoded.hash(), signed.hash());
    }

    #[test]
    fn test_legacy_wrong_chain() {
        let key = Secp256k1KeyPair::generate();
        let tx = Transaction::new_transaction(
            0,
            Address::repeat_byte(1),
            U256::one(),
            100_000,
            U256::zero(),
            vec![],
        );
        let signed = sign_tx(&tx, &Eip155Signer::new(CHAIN_ID), &key).unwrap();
        assert_eq!(
            signed.sender(&Eip155Signer::new(1u64)),
            Err(TxError::InvalidChainId)
        );
    }

    // =========================================================================
    // Dynamic fee
    // =========================================================================

    #[test]
    fn test_dynamic_fee_effective_price() {
        let tx = Transaction::new(TxData::DynamicFee(DynamicFeeTx {
            chain_id: U256::from(CHAIN_ID),
            gas: 21_000,
            gas_tip_cap: U256::from(2u64),
            gas_fee_cap: U256::from(10u64),
            ..Default::default()
        }));
        let base_fee = U256::from(4u64);
        assert_eq!(tx.tx_type(), TxType::ETHEREUM_DYNAMIC_FEE);
        assert_eq!(tx.effective_gas_tip(&base_fee), Some(U256::from(2u64)));
        assert_eq!(tx.effective_gas_price(&base_fee), U256::from(6u64));
    }

    // =========================================================================
    // Priority selector
    // =========================================================================

    #[test]
    fn test_priority_selector() {
        let now = Instant::now();
        let tx = |nonce: u64, price: u64| {
            let mut tx = Transaction::new_transaction(
                nonce,
                Address::repeat_byte(0xee),
                U256::zero(),
                21_000,
                U256::from(price),
                vec![],
            );
            tx.set_time(now);
            Arc::new(tx)
        };
        let a = Address::repeat_byte(0xa);
        let b = Address::repeat_byte(0xb);
        let mut pending = HashMap::new();
        pending.insert(a, vec![tx(0, 5), tx(1, 5)]);
        pending.insert(b, vec![tx(0, 7)]);

        let mut selector = TransactionsByPriceAndNonce::new(pending);
        let head = selector.peek().unwrap();
        assert_eq!((head.gas_price(), head.nonce()), (U256::from(7u64), 0));
        selector.shift();
        let head = selector.peek().unwrap();
        assert_eq!((head.gas_price(), head.nonce()), (U256::from(5u64), 0));
        selector.shift();
        let head = selector.peek().unwrap();
        assert_eq!((head.gas_price(), head.nonce()), (U256::from(5u64), 1));
        selector.shift();
        assert!(selector.peek().is_none());
    }

    // =========================================================================
    // Anchoring
    // =========================================================================

    #[test]
    fn test_anchoring_type0() {
        let body = AnchoringDataInternalType0 {
            block_hash: Hash::repeat_byte(0x01),
            tx_hash: Hash::repeat_byte(0x02),
            parent_hash: Hash::repeat_byte(0x03),
            receipt_hash: Hash::repeat_byte(0x04),
            state_root_hash: Hash::repeat_byte(0x05),
            block_number: U256::from(100u64),
            block_count: U256::one(),
            tx_count: U256::from(10u64),
        };
        let bytes = AnchoringData::from_type0(&body).encode();
        match decode_anchoring_data(&bytes).unwrap() {
            AnchoringDataInternal::Type0(decoded) => assert_eq!(decoded, body),
            other => panic!("expected type 0, got {other:?}"),
        }
    }

    // =========================================================================
    // Receipts
    // =========================================================================

    #[test]
    fn test_receipt_for_storage() {
        let tx_hash = keccak256(&encode(&12345u64));
        let receipt = Receipt::new(ReceiptStatus::SUCCESSFUL, tx_hash, 12345);
        let stored: ReceiptForStorage = decode(&encode(&ReceiptForStorage(receipt))).unwrap();
        let back: Receipt = stored.into();
        assert_eq!(back.status, ReceiptStatus::SUCCESSFUL);
        assert_eq!(back.tx_hash, tx_hash);
        assert_eq!(back.gas_used, 12345);
    }

    // =========================================================================
    // IBFT header hash
    // =========================================================================

    #[test]
    fn test_ibft_header_hash() {
        let mut extra = vec![0x0au8; ISTANBUL_EXTRA_VANITY];
        extra.extend_from_slice(&[0x01; 65]);
        let a = Header {
            number: U256::from(42u64),
            extra,
            ..Default::default()
        };
        let mut b = a.clone();
        for byte in &mut b.extra[ISTANBUL_EXTRA_VANITY..] {
            *byte = 0xff;
        }
        b.extra.push(0x00);

        let ibft = BlockConfig::new(EngineType::Ibft);
        assert_eq!(a.hash(&ibft), b.hash(&ibft));
        assert_ne!(
            a.hash(&BlockConfig::new(EngineType::Gxhash)),
            b.hash(&BlockConfig::new(EngineType::Gxhash))
        );
    }
}
