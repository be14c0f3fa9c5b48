//! Types shared by every FargoCoin consensus consumer.
//!
//! The consensus engine (`fargo-consensus`) reads these but never mutates them:
//! headers come from the block index owned by the node, and parameters are fixed
//! per network.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

pub mod params;

pub use params::{ConsensusParams, Network, ParamsError};

pub type Hash = [u8; 32];

/// A block header as seen by the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_block_hash: Hash,
    pub merkle_root: Hash,
    /// Seconds since the Unix epoch. Not guaranteed to increase between blocks.
    pub timestamp: i64,
    /// Compact encoding of the target this block claims to satisfy.
    pub bits: u32,
    pub nonce: u32,
    /// Height in the chain, genesis is 0.
    pub height: u32,
    /// Set for blocks produced after the switch to proof-of-stake.
    pub is_proof_of_stake: bool,
}

impl BlockHeader {
    /// Calculates the hash of the block header.
    pub fn hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&self.previous_block_hash);
        hasher.update(&self.merkle_root);
        hasher.update(&self.timestamp.to_le_bytes());
        hasher.update(&self.bits.to_le_bytes());
        hasher.update(&self.nonce.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&[self.is_proof_of_stake as u8]);
        hasher.finalize().into()
    }

    /// The header hash read as a little-endian 256-bit integer, the form compared
    /// against the target.
    pub fn pow_hash(&self) -> U256 {
        U256::from_little_endian(&self.hash())
    }

    /// Checks if the block header indicates a Proof-of-Stake block.
    pub fn is_proof_of_stake(&self) -> bool {
        self.is_proof_of_stake
    }

    pub fn is_proof_of_work(&self) -> bool {
        !self.is_proof_of_stake
    }
}
