//! One-time probe of the persistence APIs an index library exposes

use std::fmt;

use docsum_core::IndexLibrary;

use crate::strategy::PersistenceStrategy;

/// Which persistence APIs are available, computed once at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceCapabilities {
    pub storage_context: bool,
    pub load_from_storage: bool,
    pub index_save: bool,
    pub index_load: bool,
}

impl PersistenceCapabilities {
    /// Probe `library`. A missing API is recorded as `false`, never an error.
    pub fn detect<I, L>(library: &L) -> Self
    where
        L: IndexLibrary<I> + ?Sized,
    {
        Self {
            storage_context: library.storage_context().is_some(),
            load_from_storage: library.storage_loader().is_some(),
            index_save: library.legacy_saver().is_some(),
            index_load: library.legacy_loader().is_some(),
        }
    }

    pub fn all() -> Self {
        Self {
            storage_context: true,
            load_from_storage: true,
            index_save: true,
            index_load: true,
        }
    }

    /// Only the raw `index.pkl` fallback
    pub fn raw_only() -> Self {
        Self {
            storage_context: false,
            load_from_storage: false,
            index_save: false,
            index_load: false,
        }
    }

    pub fn load_strategies(&self) -> Vec<PersistenceStrategy> {
        let mut strategies = Vec::with_capacity(3);
        if self.storage_context && self.load_from_storage {
            strategies.push(PersistenceStrategy::StorageContext);
        }
        if self.index_load {
            strategies.push(PersistenceStrategy::LegacyIndexIo);
        }
        strategies.push(PersistenceStrategy::RawFallback);
        strategies
    }

    pub fn save_strategies(&self) -> Vec<PersistenceStrategy> {
        let mut strategies = Vec::with_capacity(3);
        if self.storage_context {
            strategies.push(PersistenceStrategy::StorageContext);
        }
        if self.index_save {
            strategies.push(PersistenceStrategy::LegacyIndexIo);
        }
        strategies.push(PersistenceStrategy::RawFallback);
        strategies
    }
}

impl fmt::Display for PersistenceCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "storage_context={} load_from_storage={} index_save={} index_load={}",
            self.storage_context, self.load_from_storage, self.index_save, self.index_load
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsum_core::NoIndexLibrary;
    use docsum_index::{LibraryFeatures, VectorIndexLibrary, VectorStoreIndex};
    use PersistenceStrategy::*;

    #[test]
    fn test_detect_full_library() {
        let caps = PersistenceCapabilities::detect::<VectorStoreIndex, _>(&VectorIndexLibrary::new());
        assert_eq!(caps, PersistenceCapabilities::all());
    }

    #[test]
    fn test_detect_bare_library() {
        let caps = PersistenceCapabilities::detect::<VectorStoreIndex, _>(&NoIndexLibrary);
        assert_eq!(caps, PersistenceCapabilities::raw_only());
    }

    #[test]
    fn test_detect_partial_library() {
        let library = VectorIndexLibrary::with_features(LibraryFeatures {
            load_from_storage: false,
            legacy_load: false,
            ..LibraryFeatures::all()
        });
        let caps = PersistenceCapabilities::detect::<VectorStoreIndex, _>(&library);
        assert!(caps.storage_context);
        assert!(!caps.load_from_storage);
        assert!(caps.index_save);
        assert!(!caps.index_load);
    }

    #[test]
    fn test_strategy_order() {
        let all = PersistenceCapabilities::all();
        assert_eq!(all.load_strategies(), vec![StorageContext, LegacyIndexIo, RawFallback]);
        assert_eq!(all.save_strategies(), vec![StorageContext, LegacyIndexIo, RawFallback]);

        let raw = PersistenceCapabilities::raw_only();
        assert_eq!(raw.load_strategies(), vec![RawFallback]);
        assert_eq!(raw.save_strategies(), vec![RawFallback]);
    }

    #[test]
    fn test_storage_load_needs_both_flags() {
        let caps = PersistenceCapabilities {
            load_from_storage: false,
            ..PersistenceCapabilities::all()
        };
        assert_eq!(caps.load_strategies(), vec![LegacyIndexIo, RawFallback]);
        assert_eq!(caps.save_strategies(), vec![StorageContext, LegacyIndexIo, RawFallback]);
    }
}
