//! Difficulty retargeting.
//!
//! Two rules exist. The legacy rule retargets once per epoch from the time the
//! whole epoch took, bounded to a 4x change. The moving-window rule runs every
//! block over the last 24 blocks, weighting their targets with a cumulative
//! average, bounding the change to 3x and capping the result at the ceiling of
//! the current era. The two bounds are separate policies and must stay distinct.

use fargo_shared_types::{BlockHeader, ConsensusParams};
use log::{debug, trace, warn};
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

use crate::chain::{BlockId, ChainIndex, ChainIndexError};
use crate::compact;

/// Blocks a chain needs before the moving window is used instead of the ceiling.
pub const PAST_BLOCKS_MIN: usize = 24;
/// Blocks averaged by the moving window.
pub const PAST_BLOCKS_MAX: usize = 24;

/// Largest factor the legacy rule may move the target by per epoch.
pub const LEGACY_ADJUSTMENT_FACTOR: i64 = 4;
/// Largest factor the moving-window rule may move the target by per block.
pub const WINDOW_ADJUSTMENT_FACTOR: i64 = 3;

/// Protocol phase of a block, selecting its difficulty ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    ProofOfWork,
    ProofOfStake,
}

impl Era {
    /// The era the block after `height` belongs to.
    pub fn at_height(height: u32, params: &ConsensusParams) -> Self {
        if height >= params.last_pow_block {
            Era::ProofOfStake
        } else {
            Era::ProofOfWork
        }
    }

    pub fn limit(self, params: &ConsensusParams) -> U256 {
        match self {
            Era::ProofOfWork => params.pow_limit,
            Era::ProofOfStake => params.pos_limit,
        }
    }
}

/// Bounds `actual` to `[target / factor, target * factor]`, lower bound first.
fn clamp_timespan(actual: i64, target: i64, factor: i64) -> i64 {
    let mut actual = actual;
    if actual < target / factor {
        actual = target / factor;
    }
    if actual > target.saturating_mul(factor) {
        actual = target.saturating_mul(factor);
    }
    actual
}

/// `target * actual / expected`, multiplying first in 512 bits and capped at
/// `limit`. `None` when the timespans cannot be used as unsigned factors.
fn scale_target(target: U256, actual: i64, expected: i64, limit: U256) -> Option<U256> {
    let actual = u64::try_from(actual).ok()?;
    let expected = u64::try_from(expected).ok()?;
    let scaled = target
        .full_mul(U256::from(actual))
        .checked_div(U512::from(expected))?;
    U256::try_from(scaled.min(U512::from(limit))).ok()
}

/// `(average * count + target) / (count + 1)`, the next step of the window's
/// cumulative average.
fn weighted_average(average: U256, count: u64, target: U256) -> U256 {
    let total = average.full_mul(U256::from(count)) + U512::from(target);
    // A mean of 256-bit values always fits back into 256 bits.
    U256::try_from(total / U512::from(count + 1)).unwrap_or(U256::MAX)
}

/// Legacy full-epoch retarget.
///
/// `first_block_time` is the timestamp of the first block of the epoch that
/// `last` closes.
pub fn calculate_next_work_required(
    last: &BlockHeader,
    first_block_time: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.pow_no_retargeting {
        return last.bits;
    }

    let target_timespan = params.pow_target_timespan;
    let actual_timespan = last.timestamp.saturating_sub(first_block_time);
    debug!("  actual timespan = {} before bounds", actual_timespan);
    let actual_timespan =
        clamp_timespan(actual_timespan, target_timespan, LEGACY_ADJUSTMENT_FACTOR);

    let old_target = compact::decode(last.bits).target;
    let scaled = scale_target(old_target, actual_timespan, target_timespan, params.pow_limit);
    let new_target = match scaled {
        Some(target) => target,
        None => {
            warn!(
                "retarget timespan {} is unusable, falling back to the proof-of-work limit",
                target_timespan
            );
            params.pow_limit
        }
    };
    let new_bits = compact::encode(new_target);

    debug!("legacy retarget at height {}", last.height);
    debug!("target timespan = {}    actual timespan = {}", target_timespan, actual_timespan);
    debug!("before: {:08x}  {:#x}", last.bits, old_target);
    debug!("after:  {:08x}  {:#x}", new_bits, new_target);

    new_bits
}

/// Drives the legacy retarget over `index`: between epoch boundaries the last
/// block's bits carry over, at a boundary the epoch's first block supplies the
/// start time.
pub fn next_work_required_legacy(
    index: &ChainIndex,
    last: BlockId,
    params: &ConsensusParams,
) -> Result<u32, ChainIndexError> {
    let entry = index.get(last)?;
    let interval = params.difficulty_adjustment_interval();
    if interval <= 0 || (i64::from(entry.height()) + 1) % interval != 0 {
        return Ok(entry.bits());
    }

    // height + 1 is a multiple of interval, so this never goes below zero.
    let first_height = (i64::from(entry.height()) - (interval - 1)) as u32;
    let first = index
        .ancestor(last, first_height)?
        .ok_or(ChainIndexError::MissingAncestor {
            height: first_height,
        })?;

    Ok(calculate_next_work_required(
        &entry.header,
        index.get(first)?.timestamp(),
        params,
    ))
}

/// Moving-window retarget for the block after `last`, in the era `last`'s
/// height selects.
pub fn get_next_work_required(
    index: &ChainIndex,
    last: Option<BlockId>,
    params: &ConsensusParams,
) -> Result<u32, ChainIndexError> {
    let era = match last {
        Some(id) => Era::at_height(index.get(id)?.height(), params),
        None => Era::ProofOfWork,
    };
    moving_window_retarget(index, last, era, params)
}

/// The moving-window retarget with the era chosen by the caller.
///
/// Chains shorter than [`PAST_BLOCKS_MIN`] get the proof-of-work limit in either
/// era, without looking at any block.
pub fn moving_window_retarget(
    index: &ChainIndex,
    last: Option<BlockId>,
    era: Era,
    params: &ConsensusParams,
) -> Result<u32, ChainIndexError> {
    let last = match last {
        Some(id) => id,
        None => return Ok(compact::encode(params.pow_limit)),
    };
    let height = index.get(last)?.height();
    if height == 0 || (height as usize) < PAST_BLOCKS_MIN {
        return Ok(compact::encode(params.pow_limit));
    }

    let mut average = U256::zero();
    let mut actual_timespan: i64 = 0;
    let mut last_block_time: i64 = 0;
    let mut count: u64 = 0;

    for id in index.collect_window(last, PAST_BLOCKS_MAX)? {
        let entry = index.get(id)?;
        if entry.height() == 0 {
            break;
        }
        count += 1;

        let target = compact::decode(entry.bits()).target;
        // Seeding with the newest block and then weighting by count ends up
        // counting that block twice.
        average = if count == 1 {
            target
        } else {
            weighted_average(average, count, target)
        };

        // A timestamp of zero or less never opens a pair.
        if last_block_time > 0 {
            let diff = last_block_time.saturating_sub(entry.timestamp());
            actual_timespan = actual_timespan.saturating_add(diff);
        }
        last_block_time = entry.timestamp();
        trace!("window block {} at height {}: average {:#x}", count, entry.height(), average);
    }

    let target_timespan = (count as i64).saturating_mul(params.pow_target_spacing);
    let bounded_timespan =
        clamp_timespan(actual_timespan, target_timespan, WINDOW_ADJUSTMENT_FACTOR);

    let limit = era.limit(params);
    let new_target = match scale_target(average, bounded_timespan, target_timespan, limit) {
        Some(target) => target,
        None => {
            warn!(
                "window of {} blocks has target timespan {}, falling back to the {:?} limit",
                count, target_timespan, era
            );
            limit
        }
    };
    let new_bits = compact::encode(new_target);

    debug!(
        "window retarget at height {} ({:?}): {} blocks, actual timespan {} (bounded {}), target timespan {}, new bits {:08x}",
        height, era, count, actual_timespan, bounded_timespan, target_timespan, new_bits
    );

    Ok(new_bits)
}
