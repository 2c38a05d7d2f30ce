//! # List Root Hashers
//!
//! | Hasher | Root |
//! |--------|------|
//! | [`SimpleDeriveSha`] | `keccak(rlp([item0, item1, ..]))`, items as byte strings |
//! | [`ConcatDeriveSha`] | `keccak(keccak(item0) ‖ keccak(item1) ‖ ..)` |
//!
//! Neither depends on the block number; chains that switch hashers at a fork
//! wrap these in their own [`DeriveSha`].

use crate::ports::{DerivableList, DeriveSha};
use rlp::RlpStream;
use shared_types::{keccak256, keccak256_concat, Hash};

#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleDeriveSha;

impl DeriveSha for SimpleDeriveSha {
    fn derive_sha(&self, list: &dyn DerivableList, _block_number: u64) -> Hash {
        let mut s = RlpStream::new_list(list.len());
        for i in 0..list.len() {
            s.append(&list.get_rlp(i));
        }
        keccak256(&s.out())
    }

    fn empty_root_hash(&self, _block_number: u64) -> Hash {
        keccak256(&RlpStream::new_list(0).out())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConcatDeriveSha;

impl DeriveSha for ConcatDeriveSha {
    fn derive_sha(&self, list: &dyn DerivableList, _block_number: u64) -> Hash {
        let leaves: Vec<Hash> = (0..list.len()).map(|i| keccak256(&list.get_rlp(i))).collect();
        let parts: Vec<&[u8]> = leaves.iter().map(|h| h.as_bytes()).collect();
        keccak256_concat(&parts)
    }

    fn empty_root_hash(&self, block_number: u64) -> Hash {
        self.derive_sha(&Vec::<Vec<u8>>::new(), block_number)
    }
}

impl DerivableList for Vec<Vec<u8>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get_rlp(&self, index: usize) -> Vec<u8> {
        self[index].clone()
    }
}
