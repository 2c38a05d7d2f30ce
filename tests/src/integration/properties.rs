//! # Cross-Crate Properties
//!
//! Invariants that only hold when the crates agree with each other: signer
//! caches against the transaction envelope, receipt and anchoring codecs
//! against arbitrary field values, block bodies against mixed variants.

#[cfg(test)]
mod tests {
    use kc_blocks::{
        Block, BlockConfig, Header, Receipt, ReceiptForStorage, ReceiptStatus, SimpleDeriveSha,
    };
    use kc_transactions::{
        decode_anchoring_data, sign_tx, AnchoringDataLegacy, LondonSigner, NativeBody, NativeTx,
        Transaction, TxData, TxError,
    };
    use proptest::prelude::*;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{decode, encode, Address, Hash, U256};
    use std::sync::Arc;

    fn secret() -> impl Strategy<Value = [u8; 32]> {
        // Every byte below 0x7f keeps the scalar under the curve order.
        prop::array::uniform32(1u8..0x7f)
    }

    fn hash() -> impl Strategy<Value = Hash> {
        prop::array::uniform32(any::<u8>()).prop_map(Hash::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        // =====================================================================
        // Signers
        // =====================================================================

        #[test]
        fn test_sender_stable_across_clones(
            secret in secret(),
            nonce in 0u64..1_000,
            chain in 1u64..10_000,
        ) {
            let key = Secp256k1KeyPair::from_bytes(secret).unwrap();
            let signer = LondonSigner::new(chain);
            let tx = Transaction::new_transaction(
                nonce,
                Address::repeat_byte(3),
                U256::one(),
                21_000,
                U256::one(),
                vec![],
            );
            let signed = sign_tx(&tx, &signer, &key).unwrap();

            let first = signed.sender(&signer).unwrap();
            prop_assert_eq!(first, key.address());
            prop_assert_eq!(signed.sender(&signer).unwrap(), first);
            prop_assert_eq!(signed.clone().sender(&signer).unwrap(), first);

            let other = LondonSigner::new(chain + 1);
            prop_assert_eq!(signed.sender(&other), Err(TxError::InvalidChainId));
        }

        #[test]
        fn test_native_pubkey_matches_from(secret in secret(), nonce in 0u64..1_000) {
            let key = Secp256k1KeyPair::from_bytes(secret).unwrap();
            let signer = LondonSigner::new(crate::fixtures::CHAIN_ID);
            let tx = Transaction::new(TxData::Native(NativeTx::new(
                nonce,
                U256::from(25u64),
                30_000,
                key.address(),
                NativeBody::Cancel,
                None,
            )
            .unwrap()));
            let signed = sign_tx(&tx, &signer, &key).unwrap();
            let pubkeys = signed.sender_pubkey(&signer).unwrap();
            prop_assert_eq!(pubkeys, vec![key.public_key()]);
            prop_assert_eq!(signed.sender(&signer).unwrap(), key.address());
        }

        // =====================================================================
        // Codecs
        // =====================================================================

        #[test]
        fn test_receipt_storage_preserves_identity(
            status in 0u8..0x1f,
            gas in any::<u64>(),
            tx_hash in hash(),
            contract in prop::array::uniform20(any::<u8>()),
        ) {
            let mut receipt = Receipt::new(ReceiptStatus(status), tx_hash, gas);
            receipt.contract_address = Address::from(contract);

            let stored: ReceiptForStorage = decode(&encode(&ReceiptForStorage(receipt.clone()))).unwrap();
            prop_assert_eq!(&stored.0, &receipt);

            let consensus: Receipt = decode(&encode(&receipt)).unwrap();
            prop_assert_eq!(consensus.tx_hash, Hash::zero());
            prop_assert_eq!(consensus.status, receipt.status);
            prop_assert_eq!(consensus.gas_used, gas);
        }

        #[test]
        fn test_anchoring_legacy_fallback(block_hash in hash(), number in any::<u64>()) {
            let legacy = AnchoringDataLegacy {
                block_hash,
                block_number: U256::from(number),
                ..Default::default()
            };
            let decoded = decode_anchoring_data(&encode(&legacy)).unwrap();
            prop_assert_eq!(decoded.block_hash(), block_hash);
            prop_assert_eq!(decoded.block_number(), U256::from(number));
        }

        #[test]
        fn test_block_roundtrip_mixed_bodies(
            kinds in prop::collection::vec(any::<bool>(), 0..6),
            number in 0u64..1_000_000,
        ) {
            let keys = crate::fixtures::keys(2);
            let signer = LondonSigner::new(crate::fixtures::CHAIN_ID);
            let txs: Vec<Arc<Transaction>> = kinds
                .iter()
                .enumerate()
                .map(|(nonce, native)| {
                    if *native {
                        crate::fixtures::signed_value_transfer(&keys[0], &signer, nonce as u64, 25)
                    } else {
                        crate::fixtures::signed_legacy(&keys[1], &signer, nonce as u64, 25)
                    }
                })
                .collect();
            let header = Header { number: U256::from(number), ..Default::default() };
            let block =
                Block::new(BlockConfig::default(), &header, &txs, &[], &SimpleDeriveSha).unwrap();

            let back = Block::decode(&block.encode(), BlockConfig::default()).unwrap();
            prop_assert_eq!(back.hash(), block.hash());
            prop_assert_eq!(back.transactions().len(), txs.len());
            for (a, b) in back.transactions().iter().zip(&txs) {
                prop_assert_eq!(a.hash(), b.hash());
            }
        }
    }
}
