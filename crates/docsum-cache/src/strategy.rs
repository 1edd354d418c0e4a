//! Persistence strategies and their outcomes

use std::fmt;

use docsum_core::Result;

/// A way of writing or reading a cached index, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceStrategy {
    /// The library's storage context (`docstore.json` and friends)
    StorageContext,
    /// Whole-index `save_to_disk`/`load_from_disk`
    LegacyIndexIo,
    /// Serialized index in `index.pkl`
    RawFallback,
}

impl fmt::Display for PersistenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PersistenceStrategy::StorageContext => "storage context",
            PersistenceStrategy::LegacyIndexIo => "legacy index io",
            PersistenceStrategy::RawFallback => "raw fallback",
        };
        f.write_str(name)
    }
}

/// Result of running one strategy
///
/// `Skipped` means the strategy did not apply (nothing was attempted), which
/// callers log more quietly than `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome<T> {
    Done(T),
    Skipped(String),
    Failed(String),
}

impl<T> StrategyOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, StrategyOutcome::Done(_))
    }

    pub fn into_done(self) -> Option<T> {
        match self {
            StrategyOutcome::Done(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T>> for StrategyOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => StrategyOutcome::Done(value),
            Err(e) => StrategyOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsum_core::Error;

    #[test]
    fn test_outcome_from_result() {
        let done: StrategyOutcome<u8> = Ok(3).into();
        assert_eq!(done.into_done(), Some(3));

        let failed: StrategyOutcome<u8> = Err(Error::Storage("boom".to_string())).into();
        assert_eq!(failed, StrategyOutcome::Failed("Storage context error: boom".to_string()));
        assert!(!failed.is_done());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(PersistenceStrategy::LegacyIndexIo.to_string(), "legacy index io");
    }
}
