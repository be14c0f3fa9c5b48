//! Chain work: how much effort a target represents, and what a difference in
//! accumulated work is worth in seconds at the current tip's difficulty.

use fargo_shared_types::ConsensusParams;
use log::warn;
use primitive_types::{U256, U512};

use crate::chain::{BlockId, BlockIndexEntry, ChainIndex, ChainIndexError};
use crate::compact;

/// Expected number of hashes needed to meet the target encoded by `bits`.
///
/// Invalid targets (negative, overflowed or zero) contribute no work. They are
/// not an error here; rejecting them is the proof-of-work check's job.
pub fn block_proof(bits: u32) -> U256 {
    let target = match compact::decode(bits).valid_target() {
        Some(target) => target,
        None => return U256::zero(),
    };

    // 2^256 / (target + 1) does not fit in 256 bits, but it equals
    // (2^256 - target - 1) / (target + 1) + 1, and 2^256 - target - 1 is !target.
    match target.checked_add(U256::one()) {
        Some(divisor) => (!target / divisor) + U256::one(),
        None => U256::one(),
    }
}

/// Chain work after appending a block with `bits` to a chain holding `parent_work`.
/// Wraps modulo 2^256 like the rest of the consensus arithmetic.
pub fn accumulate(parent_work: U256, bits: u32) -> U256 {
    parent_work.overflowing_add(block_proof(bits)).0
}

/// Seconds it would take, at `tip`'s difficulty and the target spacing, to produce
/// the work separating `to` from `from`. Positive when `to` has more work.
///
/// Results that need more than 63 bits saturate to `±i64::MAX`.
pub fn block_proof_equivalent_time(
    to: &BlockIndexEntry,
    from: &BlockIndexEntry,
    tip: &BlockIndexEntry,
    params: &ConsensusParams,
) -> i64 {
    let (difference, sign) = if to.chain_work > from.chain_work {
        (to.chain_work - from.chain_work, 1i64)
    } else {
        (from.chain_work - to.chain_work, -1i64)
    };

    let spacing = match u64::try_from(params.pow_target_spacing) {
        Ok(spacing) => U256::from(spacing),
        Err(_) => {
            warn!(
                "target spacing {} is negative, equivalent time is zero",
                params.pow_target_spacing
            );
            return 0;
        }
    };

    // The product can need up to 320 bits, so divide in 512.
    let scaled = difference.full_mul(spacing);
    let seconds = match scaled.checked_div(U512::from(block_proof(tip.bits()))) {
        Some(seconds) => seconds,
        None => {
            warn!(
                "tip at height {} has no block proof (bits {:08x}), saturating equivalent time",
                tip.height(),
                tip.bits()
            );
            return sign * i64::MAX;
        }
    };

    if seconds.bits() > 63 {
        return sign * i64::MAX;
    }
    sign * seconds.low_u64() as i64
}

/// [`block_proof_equivalent_time`] for blocks held in `index`.
pub fn equivalent_time(
    index: &ChainIndex,
    to: BlockId,
    from: BlockId,
    tip: BlockId,
    params: &ConsensusParams,
) -> Result<i64, ChainIndexError> {
    Ok(block_proof_equivalent_time(
        index.get(to)?,
        index.get(from)?,
        index.get(tip)?,
        params,
    ))
}
