//! Load and save an index through the best available persistence API

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info, warn};

use docsum_core::{DirectoryWriter, Error, IndexHandle, IndexLibrary, Result};

use crate::capabilities::PersistenceCapabilities;
use crate::fs::{atomic_replace_dir, staging_dir, sweep_stale_siblings};
use crate::strategy::{PersistenceStrategy, StrategyOutcome};

/// File written by the raw fallback strategy
pub const RAW_INDEX_FILE: &str = "index.pkl";

/// Persistence adapter over an [`IndexLibrary`]
///
/// Neither operation returns an error: a failed strategy is logged and the
/// next one is tried.
pub struct IndexCache<I, L> {
    library: L,
    capabilities: PersistenceCapabilities,
    _index: PhantomData<fn() -> I>,
}

impl<I, L> IndexCache<I, L>
where
    I: IndexHandle + Serialize + DeserializeOwned,
    L: IndexLibrary<I>,
{
    /// Create a cache, probing `library` for its persistence APIs
    pub fn new(library: L) -> Self {
        let capabilities = PersistenceCapabilities::detect::<I, L>(&library);
        Self::with_capabilities(library, capabilities)
    }

    /// Create a cache with a pinned capability set
    pub fn with_capabilities(library: L, capabilities: PersistenceCapabilities) -> Self {
        debug!(library = library.name(), %capabilities, "persistence capabilities");
        Self {
            library,
            capabilities,
            _index: PhantomData,
        }
    }

    pub fn capabilities(&self) -> PersistenceCapabilities {
        self.capabilities
    }

    /// Load the index cached in `cache_dir`, if any strategy can
    pub fn load_index(&self, cache_dir: &Path) -> Option<I> {
        if !cache_dir.exists() {
            debug!("no cache at {}", cache_dir.display());
            return None;
        }

        for strategy in self.capabilities.load_strategies() {
            let outcome = match strategy {
                PersistenceStrategy::StorageContext => self.load_from_storage(cache_dir),
                PersistenceStrategy::LegacyIndexIo => self.load_legacy(cache_dir),
                PersistenceStrategy::RawFallback => load_raw(cache_dir),
            };

            match outcome {
                StrategyOutcome::Done(index) => {
                    info!("loaded index from {} ({})", cache_dir.display(), strategy);
                    return Some(index);
                }
                StrategyOutcome::Skipped(reason) => debug!(%strategy, "load skipped: {}", reason),
                StrategyOutcome::Failed(reason) => warn!(%strategy, "load failed: {}", reason),
            }
        }

        None
    }

    /// Save `index` into `cache_dir`, returning whether any strategy succeeded
    pub fn save_index(&self, index: &I, cache_dir: &Path) -> bool {
        if let Err(e) = fs::create_dir_all(cache_dir) {
            warn!(error = %e, "could not create cache directory {}", cache_dir.display());
            return false;
        }
        sweep_stale_siblings(cache_dir);

        for strategy in self.capabilities.save_strategies() {
            let outcome = match strategy {
                PersistenceStrategy::StorageContext => self.save_storage(index, cache_dir),
                PersistenceStrategy::LegacyIndexIo => self.save_legacy(index, cache_dir),
                PersistenceStrategy::RawFallback => save_raw(index, cache_dir).into(),
            };

            match outcome {
                StrategyOutcome::Done(()) => {
                    info!("saved index to {} ({})", cache_dir.display(), strategy);
                    return true;
                }
                StrategyOutcome::Skipped(reason) => debug!(%strategy, "save skipped: {}", reason),
                StrategyOutcome::Failed(reason) => warn!(%strategy, "save failed: {}", reason),
            }
        }

        warn!("every persistence strategy failed for {}", cache_dir.display());
        false
    }

    fn load_from_storage(&self, cache_dir: &Path) -> StrategyOutcome<I> {
        match self.library.storage_loader() {
            Some(loader) => loader.load_index_from_storage(cache_dir).into(),
            None => StrategyOutcome::Skipped(format!("{} has no storage loader", self.library.name())),
        }
    }

    fn load_legacy(&self, cache_dir: &Path) -> StrategyOutcome<I> {
        match self.library.legacy_loader() {
            Some(loader) => {
                debug!("loading with {}", loader.method_name());
                loader.load(cache_dir).into()
            }
            None => StrategyOutcome::Skipped(format!("{} has no legacy loader", self.library.name())),
        }
    }

    fn save_storage(&self, index: &I, cache_dir: &Path) -> StrategyOutcome<()> {
        let writer = DirectoryWriter::PREFERENCE
            .into_iter()
            .find(|w| index.directory_writers().contains(w));
        let storage = self.library.storage_context();

        if writer.is_none() && storage.is_none() {
            return StrategyOutcome::Skipped(format!(
                "{} exposes no directory writer and {} has no storage context",
                index.type_name(),
                self.library.name()
            ));
        }

        stage_and_replace(cache_dir, |staging| match (writer, storage) {
            (Some(writer), _) => {
                debug!("writing index with {}", writer);
                index.write_directory(writer, staging)
            }
            (None, Some(storage)) => storage.persist(index, staging),
            (None, None) => Err(Error::Unsupported("no storage writer".to_string())),
        })
        .into()
    }

    fn save_legacy(&self, index: &I, cache_dir: &Path) -> StrategyOutcome<()> {
        match self.library.legacy_saver() {
            Some(saver) => {
                debug!("saving with {}", saver.method_name());
                stage_and_replace(cache_dir, |staging| saver.save(index, staging)).into()
            }
            None => StrategyOutcome::Skipped(format!("{} has no legacy saver", self.library.name())),
        }
    }
}

/// Write into a fresh staging directory, then swap it in for `cache_dir`
fn stage_and_replace<F>(cache_dir: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let staging = staging_dir(cache_dir)?;
    write(staging.path())?;
    atomic_replace_dir(staging.path(), cache_dir)
}

fn load_raw<I: DeserializeOwned>(cache_dir: &Path) -> StrategyOutcome<I> {
    let path = cache_dir.join(RAW_INDEX_FILE);
    if !path.is_file() {
        return StrategyOutcome::Skipped(format!("{} not found", path.display()));
    }

    let read = || -> Result<I> {
        let file = fs::File::open(&path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    };
    read().into()
}

/// Stage a directory holding only `index.pkl`, so no earlier layout survives
fn save_raw<I: Serialize>(index: &I, cache_dir: &Path) -> Result<()> {
    stage_and_replace(cache_dir, |staging| {
        let file = fs::File::create(staging.join(RAW_INDEX_FILE))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, index)?;
        writer.flush()?;
        Ok(())
    })
}
