//! Index cache for docsum
//!
//! Saving and loading an index goes through whichever persistence APIs the
//! index library exposes, probed once into [`PersistenceCapabilities`]. Each
//! strategy is tried in priority order and a raw `index.pkl` blob is the last
//! resort. Directory saves are staged next to the cache directory and swapped
//! in with [`atomic_replace_dir`].

pub mod cache;
pub mod capabilities;
pub mod fs;
pub mod strategy;

pub use cache::{IndexCache, RAW_INDEX_FILE};
pub use capabilities::PersistenceCapabilities;
pub use fs::{atomic_replace_dir, staging_dir, sweep_stale_siblings};
pub use strategy::{PersistenceStrategy, StrategyOutcome};
