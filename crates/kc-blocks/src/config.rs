//! Block-level configuration.

use serde::{Deserialize, Serialize};

/// Consensus engine sealing the chain; decides how header hashes are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// Seals live in `Extra` past the vanity prefix and are not hashed.
    #[default]
    Ibft,
    Clique,
    Gxhash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub engine: EngineType,
}

impl BlockConfig {
    pub fn new(engine: EngineType) -> Self {
        Self { engine }
    }

    /// Parses a JSON document.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
