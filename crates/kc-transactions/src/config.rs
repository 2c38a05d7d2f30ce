//! Configuration for the transaction core.

use crate::signer::{Eip155Signer, LondonSigner, TxSigner};
use serde::{Deserialize, Serialize};

/// Fork switches in effect at one block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkRules {
    /// Flat payload pricing, signature-count based multisig gas.
    pub is_istanbul: bool,
    /// Ethereum typed transactions are accepted.
    pub is_eth_tx_type: bool,
}

/// Chain parameters the transaction core consults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// EIP-155 chain id
    pub chain_id: u64,
    /// First block priced with Istanbul rules
    pub istanbul_compatible_block: Option<u64>,
    /// First block accepting access-list and dynamic-fee transactions
    pub eth_tx_type_compatible_block: Option<u64>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            istanbul_compatible_block: Some(0),
            eth_tx_type_compatible_block: Some(0),
        }
    }
}

fn is_forked(fork: Option<u64>, block_number: u64) -> bool {
    fork.map_or(false, |activation| activation <= block_number)
}

impl ProtocolConfig {
    /// Parses a JSON document.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn rules(&self, block_number: u64) -> ForkRules {
        ForkRules {
            is_istanbul: is_forked(self.istanbul_compatible_block, block_number),
            is_eth_tx_type: is_forked(self.eth_tx_type_compatible_block, block_number),
        }
    }

    /// The signer valid at `block_number`.
    pub fn make_signer(&self, block_number: u64) -> Box<dyn TxSigner> {
        if self.rules(block_number).is_eth_tx_type {
            Box::new(LondonSigner::new(self.chain_id))
        } else {
            Box::new(Eip155Signer::new(self.chain_id))
        }
    }

    /// The most permissive signer this chain will ever accept.
    pub fn latest_signer(&self) -> Box<dyn TxSigner> {
        if self.eth_tx_type_compatible_block.is_some() {
            Box::new(LondonSigner::new(self.chain_id))
        } else {
            Box::new(Eip155Signer::new(self.chain_id))
        }
    }
}
