//! Guards applied around emission.
//!
//! - **Path safety**: targets resolve to files under the output root
//! - **Output overlap**: one claimant per target per run
//! - **Determinism**: input fingerprint and timestamp-insensitive content hashes

pub mod determinism;
pub mod output_overlap;
pub mod path_safety;

pub use determinism::DeterminismGuard;
pub use output_overlap::OutputOverlapGuard;
pub use path_safety::{check_target, resolve_source_path};
