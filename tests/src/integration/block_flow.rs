//! # Block Building Flow
//!
//! ```text
//! signed txs ──► recover_senders ──► per-account queues ──► selector
//!                                                             │
//!      decoded block ◄── wire bytes ◄── Block::new ◄── receipts
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, KeyRegistry, CHAIN_ID};
    use kc_blocks::{
        fill_contract_address, Block, BlockConfig, DeriveSha, Header, Receipt, ReceiptStatus,
        SimpleDeriveSha,
    };
    use kc_ordering::{sort_by_nonce, tx_difference, TransactionsByPriceAndNonce};
    use kc_telemetry::{init_logging, TelemetryConfig};
    use kc_transactions::{recover_senders, LondonSigner, ProtocolConfig, Transaction};
    use shared_types::{Address, U256};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pending(signer: &LondonSigner) -> Vec<Arc<Transaction>> {
        let keys = fixtures::keys(3);
        let mut txs = Vec::new();
        // Submitted out of nonce order on purpose.
        for nonce in (0..3).rev() {
            txs.push(fixtures::signed_legacy(&keys[0], signer, nonce, 30));
        }
        for nonce in 0..2 {
            txs.push(fixtures::signed_value_transfer(&keys[1], signer, nonce, 50));
        }
        txs.push(fixtures::signed_legacy(&keys[2], signer, 0, 10));
        txs
    }

    #[test]
    fn test_pool_to_block() {
        let _ = init_logging(&TelemetryConfig {
            log_level: "warn".into(),
            ..Default::default()
        });

        let protocol = ProtocolConfig {
            chain_id: CHAIN_ID,
            ..Default::default()
        };
        let rules = protocol.rules(1);
        let signer = LondonSigner::new(CHAIN_ID);
        let txs = pending(&signer);

        // Group by recovered sender, then order each queue by nonce.
        let senders = recover_senders(&signer, &txs);
        let mut queues: HashMap<Address, Vec<Arc<Transaction>>> = HashMap::new();
        for (tx, sender) in txs.iter().zip(senders) {
            queues.entry(sender.unwrap()).or_default().push(Arc::clone(tx));
        }
        for queue in queues.values_mut() {
            sort_by_nonce(queue);
        }

        // Fill the block in selector order, one receipt per transaction.
        let registry = KeyRegistry::default();
        let mut selector = TransactionsByPriceAndNonce::new(queues);
        let mut included = Vec::new();
        let mut receipts = Vec::new();
        let mut gas_used = 0;
        while let Some(tx) = selector.peek().cloned() {
            let gas = tx.validate_sender(&signer, &registry, &rules).unwrap();
            let from = tx.validated_sender();
            let mut receipt = Receipt::new(ReceiptStatus::SUCCESSFUL, tx.hash(), gas);
            fill_contract_address(&tx, &from, &mut receipt);
            gas_used += gas;
            receipts.push(receipt);
            included.push(tx);
            selector.shift();
        }
        assert_eq!(included.len(), txs.len());
        assert!(tx_difference(&txs, &included).is_empty());

        // Highest price first, nonces ascending within the account.
        assert_eq!(included[0].gas_price(), U256::from(50u64));
        assert_eq!(included[0].nonce(), 0);
        assert_eq!(included[1].nonce(), 1);
        assert_eq!(included.last().unwrap().gas_price(), U256::from(10u64));

        let header = Header {
            number: U256::one(),
            gas_used,
            ..Default::default()
        };
        let block = Block::new(
            BlockConfig::default(),
            &header,
            &included,
            &receipts,
            &SimpleDeriveSha,
        )
        .unwrap();
        assert_eq!(block.receipt_hash(), SimpleDeriveSha.derive_sha(&receipts, 1));

        // The decoded block recovers to the same senders.
        let decoded = Block::decode(&block.encode(), BlockConfig::default()).unwrap();
        assert_eq!(decoded.hash(), block.hash());
        let again = recover_senders(&signer, decoded.transactions());
        for (tx, sender) in included.iter().zip(again) {
            assert_eq!(sender.unwrap(), tx.validated_sender());
        }
    }

    #[test]
    fn test_unexecutable_account_is_skipped() {
        let signer = LondonSigner::new(CHAIN_ID);
        let keys = fixtures::keys(2);
        let mut queues = HashMap::new();
        queues.insert(
            keys[0].address(),
            (0..3)
                .map(|n| fixtures::signed_legacy(&keys[0], &signer, n, 40))
                .collect::<Vec<_>>(),
        );
        queues.insert(
            keys[1].address(),
            vec![fixtures::signed_legacy(&keys[1], &signer, 0, 20)],
        );

        let mut selector = TransactionsByPriceAndNonce::new(queues);
        let head = selector.peek().cloned().unwrap();
        head.mark_unexecutable(true);
        assert!(head.is_marked_unexecutable());
        selector.pop();

        let rest: Vec<_> = std::iter::from_fn(|| {
            let tx = selector.peek().cloned();
            selector.shift();
            tx
        })
        .collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].gas_price(), U256::from(20u64));
    }
}
