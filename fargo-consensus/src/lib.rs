//! `fargo-consensus` decides and checks the work a FargoCoin block must carry.
//!
//! # Modules
//!
//! - `compact`: the 32-bit compact target encoding.
//! - `chain`: an append-only block index and the backward walks over it.
//! - `difficulty`: the legacy epoch retarget and the 24-block moving-window
//!   retarget used once the chain runs on proof-of-stake.
//! - `pow`: checking a block hash against its claimed target.
//! - `work`: per-block and cumulative chain work.
//!
//! Everything here is a pure function of its inputs. Consensus parameters are
//! always passed in explicitly.
//!
//! ```rust
//! use fargo_consensus::{compact, difficulty, ChainIndex};
//! use fargo_shared_types::ConsensusParams;
//!
//! let params = ConsensusParams::mainnet();
//! let index = ChainIndex::new();
//! let bits = difficulty::get_next_work_required(&index, None, &params).unwrap();
//! assert_eq!(compact::decode(bits).target, params.pow_limit);
//! ```

pub mod chain;
pub mod compact;
pub mod difficulty;
pub mod error;
pub mod pow;
pub mod work;

pub use chain::{BlockId, BlockIndexEntry, ChainIndex, ChainIndexError};
pub use compact::DecodedTarget;
pub use difficulty::{
    calculate_next_work_required, get_next_work_required, moving_window_retarget,
    next_work_required_legacy, Era,
};
pub use error::{ConsensusError, TargetRejection};
pub use pow::{check_header_proof_of_work, check_proof_of_work};
pub use work::{block_proof, block_proof_equivalent_time, equivalent_time};
