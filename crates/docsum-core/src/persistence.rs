//! Persistence surface an index library may expose
//!
//! Index libraries differ in how (and whether) they persist an index. Each
//! capability is a separate optional accessor on [`IndexLibrary`], so a caller
//! can probe what is available once and pick a strategy without scattering
//! existence checks through its save/load code.

use std::path::Path;

use crate::Result;

/// Storage-context persistence: write an index into a directory-backed context
pub trait StorageContextApi<I>: Send + Sync {
    /// Build a storage context rooted at `persist_dir` and persist `index` through it
    fn persist(&self, index: &I, persist_dir: &Path) -> Result<()>;
}

/// Companion loader for storage-context persistence
pub trait StorageLoader<I>: Send + Sync {
    /// Build a storage context rooted at `persist_dir` and load the index it holds
    fn load_index_from_storage(&self, persist_dir: &Path) -> Result<I>;
}

/// Legacy whole-index save (`save_to_disk` or `save` on the index type)
pub trait LegacyIndexSave<I>: Send + Sync {
    /// Name of the method the library exposes
    fn method_name(&self) -> &'static str;

    fn save(&self, index: &I, dir: &Path) -> Result<()>;
}

/// Legacy whole-index load (`load_from_disk` or `load` on the index type)
pub trait LegacyIndexLoad<I>: Send + Sync {
    /// Name of the method the library exposes
    fn method_name(&self) -> &'static str;

    fn load(&self, dir: &Path) -> Result<I>;
}

/// Trait for index libraries, exposing zero or more persistence APIs
pub trait IndexLibrary<I>: Send + Sync {
    /// Library name, used in log output
    fn name(&self) -> &str;

    fn storage_context(&self) -> Option<&dyn StorageContextApi<I>> {
        None
    }

    fn storage_loader(&self) -> Option<&dyn StorageLoader<I>> {
        None
    }

    fn legacy_saver(&self) -> Option<&dyn LegacyIndexSave<I>> {
        None
    }

    fn legacy_loader(&self) -> Option<&dyn LegacyIndexLoad<I>> {
        None
    }
}

/// A library with no persistence API at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndexLibrary;

impl<I> IndexLibrary<I> for NoIndexLibrary {
    fn name(&self) -> &str {
        "none"
    }
}
