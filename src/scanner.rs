use jwalk::WalkDir;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hashing::file_md5;
use crate::models::FileInfo;

/// Enumerate the regular files under `root` without reading their content.
///
/// Files come back sorted by relative path, compared segment by segment.
/// Both the catalog and the piece stream use this order. `md5` is left unset.
/// `output_file` is skipped if it lies inside the tree, so a torrent written
/// into its own source directory is never cataloged by a later run.
pub fn scan_files(root: &Path, output_file: Option<&Path>) -> Result<(Vec<FileInfo>, u64)> {
    let root = resolve_root(root)?;
    let output_canonical = output_file.and_then(|p| p.canonicalize().ok());

    let mut files = Vec::new();
    let mut total_size = 0u64;

    for entry in WalkDir::new(&root).skip_hidden(false).follow_links(false) {
        let entry = entry.map_err(|e| Error::io(&root, io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let full_path = entry.path();
        if output_canonical.as_deref() == Some(full_path.as_path()) {
            debug!(path = %full_path.display(), "Skipping output file");
            continue;
        }

        let metadata = entry
            .metadata()
            .map_err(|e| Error::io(&full_path, io::Error::other(e)))?;
        let len = metadata.len();

        let path = relative_path(&root, &full_path);
        debug!(path = %path.display(), len, "found file");

        files.push(FileInfo {
            path,
            full_path,
            len,
            md5: None,
        });
        total_size += len;
    }

    // Sort files by path (critical for consistent info hash)
    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        files = files.len(),
        total_size,
        "Scanned {}",
        root.display()
    );
    Ok((files, total_size))
}

/// Build the file catalog for `root`: every regular file with its size,
/// relative path and whole-file MD5, in traversal order.
pub fn build_catalog(root: &Path) -> Result<Vec<FileInfo>> {
    let (files, _) = scan_files(root, None)?;
    files
        .into_iter()
        .map(|mut file| {
            file.md5 = Some(file_md5(&file.full_path)?);
            Ok(file)
        })
        .collect()
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    let resolved = root
        .canonicalize()
        .map_err(|_| Error::PathNotFound(root.to_path_buf()))?;
    if !resolved.is_dir() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }
    Ok(resolved)
}

/// Path of `path` below `root`, falling back to the base name when nothing
/// is left after stripping the root.
fn relative_path(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => path.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}
