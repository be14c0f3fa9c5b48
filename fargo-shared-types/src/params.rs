//! Per-network consensus parameters.
//!
//! Parameters are plain immutable data passed by reference into every consensus
//! function. Targets serialize as `0x`-prefixed hex strings, so a parameter file
//! reads like:
//!
//! ```json
//! {
//!   "pow_limit": "0xfffff000000000000000000000000000000000000000000000000000000",
//!   "pos_limit": "0xfffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
//!   "pow_target_spacing": 60,
//!   "pow_target_timespan": 86400,
//!   "pow_no_retargeting": false,
//!   "last_pow_block": 10000
//! }
//! ```

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proof-of-work ceiling shared by mainnet and testnet (compact `0x1e0fffff`).
pub const MAINNET_POW_LIMIT: U256 = U256([0, 0, 0, 0x0000_0fff_ff00_0000]);

/// Proof-of-stake ceiling, `2^236 - 1`.
pub const MAINNET_POS_LIMIT: U256 = U256([u64::MAX, u64::MAX, u64::MAX, 0x0000_0fff_ffff_ffff]);

/// Regtest ceiling (compact `0x207fffff`), low enough difficulty to mine on a CPU instantly.
pub const REGTEST_POW_LIMIT: U256 = U256([u64::MAX, u64::MAX, u64::MAX, 0x7fff_ffff_ffff_ffff]);

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Failed to parse consensus parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Target block spacing must be greater than zero")]
    ZeroTargetSpacing,
    #[error("Retarget timespan must be greater than zero")]
    ZeroTargetTimespan,
    #[error("Retarget timespan {timespan}s is not a whole number of {spacing}s blocks")]
    TimespanNotMultipleOfSpacing { timespan: i64, spacing: i64 },
    #[error("{0} must be non-zero")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn params(self) -> ConsensusParams {
        ConsensusParams::for_network(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Easiest target a proof-of-work block may claim
    pub pow_limit: U256,
    /// Easiest target a block may claim once the chain runs on proof-of-stake
    pub pos_limit: U256,
    /// Expected seconds between blocks
    pub pow_target_spacing: i64,
    /// Length of a legacy retarget epoch in seconds
    pub pow_target_timespan: i64,
    /// Keep the previous block's bits forever (regtest)
    pub pow_no_retargeting: bool,
    /// Height from which blocks belong to the proof-of-stake era
    pub last_pow_block: u32,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        ConsensusParams {
            pow_limit: MAINNET_POW_LIMIT,
            pos_limit: MAINNET_POS_LIMIT,
            pow_target_spacing: 60,          // 1 minute
            pow_target_timespan: 24 * 60 * 60, // 1 day
            pow_no_retargeting: false,
            last_pow_block: 10_000,
        }
    }
}

impl ConsensusParams {
    pub fn mainnet() -> Self {
        Self::default()
    }

    pub fn testnet() -> Self {
        ConsensusParams {
            pow_target_timespan: 60 * 60, // 1 hour
            last_pow_block: 500,
            ..Default::default()
        }
    }

    pub fn regtest() -> Self {
        ConsensusParams {
            pow_limit: REGTEST_POW_LIMIT,
            pos_limit: REGTEST_POW_LIMIT,
            pow_target_timespan: 60 * 60,
            pow_no_retargeting: true,
            last_pow_block: 100,
            ..Default::default()
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Parses and validates a JSON parameter set.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: ConsensusParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ParamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.pow_target_spacing <= 0 {
            return Err(ParamsError::ZeroTargetSpacing);
        }
        if self.pow_target_timespan <= 0 {
            return Err(ParamsError::ZeroTargetTimespan);
        }
        if self.pow_target_timespan % self.pow_target_spacing != 0 {
            return Err(ParamsError::TimespanNotMultipleOfSpacing {
                timespan: self.pow_target_timespan,
                spacing: self.pow_target_spacing,
            });
        }
        if self.pow_limit.is_zero() {
            return Err(ParamsError::ZeroLimit("pow_limit"));
        }
        if self.pos_limit.is_zero() {
            return Err(ParamsError::ZeroLimit("pos_limit"));
        }
        Ok(())
    }

    /// Number of blocks in one legacy retarget epoch, zero when the spacing is.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan
            .checked_div(self.pow_target_spacing)
            .unwrap_or(0)
    }
}
