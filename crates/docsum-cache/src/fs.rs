//! Staging directories and atomic directory replacement

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use docsum_core::{Error, Result};

fn split_target(target: &Path) -> Result<(PathBuf, String)> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Persistence(format!("{} has no final path component", target.display())))?;

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((parent, name))
}

/// Create a fresh hidden sibling of `target` (`.<name>.tmp<random>`)
///
/// The directory is removed when the guard drops, unless it has been moved
/// into place by [`atomic_replace_dir`] first.
pub fn staging_dir(target: &Path) -> Result<TempDir> {
    let (parent, name) = split_target(target)?;
    fs::create_dir_all(&parent)?;
    let dir = tempfile::Builder::new()
        .prefix(&format!(".{}.tmp", name))
        .tempdir_in(&parent)?;
    Ok(dir)
}

/// Remove `.<name>.tmp*` and `.<name>.old*` siblings left by an interrupted save
pub fn sweep_stale_siblings(target: &Path) {
    let Ok((parent, name)) = split_target(target) else {
        return;
    };
    let Ok(entries) = fs::read_dir(&parent) else {
        return;
    };

    let prefixes = [format!(".{}.tmp", name), format!(".{}.old", name)];
    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !prefixes.iter().any(|p| file_name.starts_with(p.as_str())) {
            continue;
        }

        let path = entry.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match removed {
            Ok(()) => debug!("removed stale {}", path.display()),
            Err(e) => warn!(error = %e, "could not remove stale {}", path.display()),
        }
    }
}

/// Replace `dst` (file, directory or nothing) with the populated directory `src`
///
/// The old content is renamed aside first and only removed once `src` is in
/// place; if moving `src` fails it is restored.
pub fn atomic_replace_dir(src: &Path, dst: &Path) -> Result<()> {
    let (parent, name) = split_target(dst)?;

    let aside = if dst.exists() || dst.is_symlink() {
        let holder = tempfile::Builder::new()
            .prefix(&format!(".{}.old", name))
            .tempdir_in(&parent)?;
        let old = holder.path().join(&name);
        fs::rename(dst, &old)?;
        Some((holder, old))
    } else {
        None
    };

    let moved = match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(error = %e, "rename failed, copying {} instead", src.display());
            copy_dir(src, dst).and_then(|()| fs::remove_dir_all(src).map_err(Error::from))
        }
    };

    if let Err(e) = moved {
        if let Some((_holder, old)) = &aside {
            if dst.exists() {
                let _ = fs::remove_dir_all(dst);
            }
            if let Err(restore) = fs::rename(old, dst) {
                warn!(error = %restore, "could not restore {}", dst.display());
            }
        }
        return Err(e);
    }

    // Dropping the holder removes the old content.
    drop(aside);
    Ok(())
}

/// Non-atomic recursive copy, only used when `src` cannot be renamed
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::Persistence(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
