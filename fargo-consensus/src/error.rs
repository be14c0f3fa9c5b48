use primitive_types::U256;
use std::fmt;
use thiserror::Error;

use crate::chain::ChainIndexError;

/// Why a compact target was refused before any hash comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRejection {
    Negative,
    Zero,
    Overflow,
    AboveLimit,
}

impl fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TargetRejection::Negative => "target is negative",
            TargetRejection::Zero => "target is zero",
            TargetRejection::Overflow => "target overflows 256 bits",
            TargetRejection::AboveLimit => "target is easier than the proof-of-work limit",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, PartialEq, Eq, Error, Clone)]
pub enum ConsensusError {
    #[error("Invalid target encoding {bits:#010x}: {reason}")]
    InvalidTargetEncoding { bits: u32, reason: TargetRejection },
    #[error("Block hash {hash:#x} exceeds target {target:#x}")]
    HashExceedsTarget { hash: U256, target: U256 },
    #[error("Block index error: {0}")]
    ChainIndex(#[from] ChainIndexError),
}
