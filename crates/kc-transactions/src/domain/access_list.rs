//! EIP-2930 access lists.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash};

/// One address and the storage slots it pre-warms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTuple {
    pub address: Address,
    pub storage_keys: Vec<Hash>,
}

impl Encodable for AccessTuple {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.begin_list(self.storage_keys.len());
        for key in &self.storage_keys {
            s.append(key);
        }
    }
}

impl Decodable for AccessTuple {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            address: rlp.val_at(0)?,
            storage_keys: rlp.list_at(1)?,
        })
    }
}

/// Ordered list of access tuples.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(pub Vec<AccessTuple>);

impl AccessList {
    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of storage keys across all tuples.
    pub fn storage_keys(&self) -> usize {
        self.0.iter().map(|t| t.storage_keys.len()).sum()
    }
}

impl Encodable for AccessList {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(self.0.len());
        for tuple in &self.0 {
            s.append(tuple);
        }
    }
}

impl Decodable for AccessList {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        Ok(Self(rlp.as_list()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let list = AccessList(vec![
            AccessTuple {
                address: Address::repeat_byte(1),
                storage_keys: vec![Hash::repeat_byte(1), Hash::repeat_byte(2)],
            },
            AccessTuple {
                address: Address::repeat_byte(2),
                storage_keys: vec![],
            },
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.storage_keys(), 2);
        let decoded: AccessList = rlp::decode(&rlp::encode(&list)).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_empty_list_is_c0() {
        assert_eq!(rlp::encode(&AccessList::default()).to_vec(), vec![0xc0]);
    }

    #[test]
    fn test_json_field_names() {
        let tuple = AccessTuple {
            address: Address::zero(),
            storage_keys: vec![],
        };
        let json = serde_json::to_value(&tuple).unwrap();
        assert!(json.get("storageKeys").is_some());
    }
}
