//! Persistence surface of the vector index library

use serde::{Deserialize, Serialize};
use std::path::Path;

use docsum_core::{
    IndexLibrary, LegacyIndexLoad, LegacyIndexSave, Result, StorageContextApi, StorageLoader,
};

use crate::storage::{self, StorageContext};
use crate::vector_index::VectorStoreIndex;

/// Which persistence APIs this library build exposes
///
/// Older releases only had whole-index `save_to_disk`/`load_from_disk`; newer
/// ones persist through a storage context. Both can be switched off to mimic a
/// release that lacks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFeatures {
    pub storage_context: bool,
    pub load_from_storage: bool,
    pub legacy_save: bool,
    pub legacy_load: bool,
}

impl LibraryFeatures {
    pub fn all() -> Self {
        Self {
            storage_context: true,
            load_from_storage: true,
            legacy_save: true,
            legacy_load: true,
        }
    }

    pub fn none() -> Self {
        Self {
            storage_context: false,
            load_from_storage: false,
            legacy_save: false,
            legacy_load: false,
        }
    }

    pub fn legacy_only() -> Self {
        Self {
            legacy_save: true,
            legacy_load: true,
            ..Self::none()
        }
    }
}

impl Default for LibraryFeatures {
    fn default() -> Self {
        Self::all()
    }
}

/// [`IndexLibrary`] implementation for [`VectorStoreIndex`]
#[derive(Debug, Clone, Default)]
pub struct VectorIndexLibrary {
    features: LibraryFeatures,
}

impl VectorIndexLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(features: LibraryFeatures) -> Self {
        Self { features }
    }

    pub fn features(&self) -> LibraryFeatures {
        self.features
    }
}

impl StorageContextApi<VectorStoreIndex> for VectorIndexLibrary {
    fn persist(&self, index: &VectorStoreIndex, persist_dir: &Path) -> Result<()> {
        StorageContext::from_index(index).persist(persist_dir)
    }
}

impl StorageLoader<VectorStoreIndex> for VectorIndexLibrary {
    fn load_index_from_storage(&self, persist_dir: &Path) -> Result<VectorStoreIndex> {
        storage::load_index_from_storage(StorageContext::from_defaults(persist_dir)?)
    }
}

impl LegacyIndexSave<VectorStoreIndex> for VectorIndexLibrary {
    fn method_name(&self) -> &'static str {
        "save_to_disk"
    }

    fn save(&self, index: &VectorStoreIndex, dir: &Path) -> Result<()> {
        storage::save_to_disk(index, dir)
    }
}

impl LegacyIndexLoad<VectorStoreIndex> for VectorIndexLibrary {
    fn method_name(&self) -> &'static str {
        "load_from_disk"
    }

    fn load(&self, dir: &Path) -> Result<VectorStoreIndex> {
        storage::load_from_disk(dir)
    }
}

impl IndexLibrary<VectorStoreIndex> for VectorIndexLibrary {
    fn name(&self) -> &str {
        "docsum-index"
    }

    fn storage_context(&self) -> Option<&dyn StorageContextApi<VectorStoreIndex>> {
        self.features
            .storage_context
            .then_some(self as &dyn StorageContextApi<VectorStoreIndex>)
    }

    fn storage_loader(&self) -> Option<&dyn StorageLoader<VectorStoreIndex>> {
        self.features
            .load_from_storage
            .then_some(self as &dyn StorageLoader<VectorStoreIndex>)
    }

    fn legacy_saver(&self) -> Option<&dyn LegacyIndexSave<VectorStoreIndex>> {
        self.features
            .legacy_save
            .then_some(self as &dyn LegacyIndexSave<VectorStoreIndex>)
    }

    fn legacy_loader(&self) -> Option<&dyn LegacyIndexLoad<VectorStoreIndex>> {
        self.features
            .legacy_load
            .then_some(self as &dyn LegacyIndexLoad<VectorStoreIndex>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_exposes_everything() {
        let library = VectorIndexLibrary::new();
        assert!(library.storage_context().is_some());
        assert!(library.storage_loader().is_some());
        assert_eq!(library.legacy_saver().map(|s| s.method_name()), Some("save_to_disk"));
        assert_eq!(library.legacy_loader().map(|l| l.method_name()), Some("load_from_disk"));
    }

    #[test]
    fn test_disabled_features_are_absent() {
        let library = VectorIndexLibrary::with_features(LibraryFeatures::legacy_only());
        assert!(library.storage_context().is_none());
        assert!(library.storage_loader().is_none());
        assert!(library.legacy_saver().is_some());
        assert!(library.legacy_loader().is_some());

        let bare = VectorIndexLibrary::with_features(LibraryFeatures::none());
        assert!(bare.legacy_saver().is_none());
    }
}
