//! Proof-of-work verification.

use fargo_shared_types::{BlockHeader, ConsensusParams};
use primitive_types::U256;

use crate::compact;
use crate::error::{ConsensusError, TargetRejection};

/// Checks that `hash` meets the target encoded in `bits`.
///
/// The target itself must be well formed and no easier than `params.pow_limit`,
/// otherwise the block is rejected with [`ConsensusError::InvalidTargetEncoding`]
/// without looking at the hash.
pub fn check_proof_of_work(
    hash: U256,
    bits: u32,
    params: &ConsensusParams,
) -> Result<(), ConsensusError> {
    let decoded = compact::decode(bits);

    let rejection = if decoded.negative {
        Some(TargetRejection::Negative)
    } else if decoded.overflow {
        Some(TargetRejection::Overflow)
    } else if decoded.target.is_zero() {
        Some(TargetRejection::Zero)
    } else if decoded.target > params.pow_limit {
        Some(TargetRejection::AboveLimit)
    } else {
        None
    };
    if let Some(reason) = rejection {
        return Err(ConsensusError::InvalidTargetEncoding { bits, reason });
    }

    if hash > decoded.target {
        return Err(ConsensusError::HashExceedsTarget {
            hash,
            target: decoded.target,
        });
    }

    Ok(())
}

/// Hashes `header` and checks it against its own `bits`.
pub fn check_header_proof_of_work(
    header: &BlockHeader,
    params: &ConsensusParams,
) -> Result<(), ConsensusError> {
    check_proof_of_work(header.pow_hash(), header.bits, params)
}
