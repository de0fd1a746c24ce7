use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hashing::hash_catalog;
use crate::metainfo::{TorrentMetadata, assemble, check_name, check_tracker_url};
use crate::models::TorrentOptions;
use crate::piece::{PieceSize, calculate_num_pieces};
use crate::scanner::scan_files;

/// Builder for creating torrent files
pub struct TorrentBuilder {
    source: PathBuf,
    output_file: Option<PathBuf>,
    options: TorrentOptions,
    show_progress: bool,
}

/// What a build would produce, computed without hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    pub name: String,
    pub file_count: usize,
    pub total_size: u64,
    pub piece_length: u32,
    pub piece_count: u64,
}

impl TorrentBuilder {
    /// Create a new TorrentBuilder
    pub fn new(source: PathBuf, options: TorrentOptions) -> Self {
        Self {
            source,
            output_file: None,
            options,
            show_progress: false,
        }
    }

    /// Set the output file path for exclusion from scanning
    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = Some(output);
        self
    }

    /// Enable progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.show_progress = progress;
        self
    }

    /// Torrent name: the configured one, else the source directory's name
    pub fn torrent_name(&self) -> Result<String> {
        if let Some(name) = &self.options.name {
            check_name(name)?;
            return Ok(name.clone());
        }
        let base = match self.source.file_name() {
            Some(name) => Some(name.to_os_string()),
            None => self
                .source
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_os_string())),
        };
        base.map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::invalid("torrent name is required"))
    }

    fn validate(&self) -> Result<String> {
        if !self.source.is_dir() {
            return Err(Error::PathNotFound(self.source.clone()));
        }
        let name = self.torrent_name()?;
        check_tracker_url(&self.options.announce)?;
        Ok(name)
    }

    fn created_at(&self) -> Result<DateTime<Utc>> {
        match self.options.creation_date {
            Some(timestamp) => DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
                Error::invalid(format!("creation date {timestamp} is out of range"))
            }),
            None => Ok(Utc::now()),
        }
    }

    /// Scan the source and resolve the piece size without hashing anything
    pub fn dry_run(&self) -> Result<DryRun> {
        let name = self.validate()?;
        let (files, total_size) = scan_files(&self.source, self.output_file.as_deref())?;
        let piece_length = self.options.piece_size.resolve(total_size)?;

        Ok(DryRun {
            name,
            file_count: files.len(),
            total_size,
            piece_length,
            piece_count: calculate_num_pieces(total_size, u64::from(piece_length)),
        })
    }

    /// Number of pieces the source splits into at the configured piece size.
    ///
    /// Only concrete piece sizes are accepted; `Auto` is rejected.
    pub fn piece_count(&self) -> Result<u64> {
        if !self.source.is_dir() {
            return Err(Error::PathNotFound(self.source.clone()));
        }
        let piece_length = self.options.piece_size.bytes().ok_or_else(|| {
            Error::invalid("piece size must be specified when calculating pieces")
        })?;
        let (_, total_size) = scan_files(&self.source, self.output_file.as_deref())?;
        Ok(calculate_num_pieces(total_size, u64::from(piece_length)))
    }

    /// Build the torrent metadata
    pub fn build(&self) -> Result<TorrentMetadata> {
        self.build_excluding(self.output_file.as_deref())
    }

    fn build_excluding(&self, output_file: Option<&Path>) -> Result<TorrentMetadata> {
        let name = self.validate()?;
        let created_at = self.created_at()?;

        debug!(source = %self.source.display(), "Scanning files");
        let (mut files, total_size) = scan_files(&self.source, output_file)?;

        let piece_length = self.options.piece_size.resolve(total_size)?;
        info!(
            piece_length,
            requested = %self.options.piece_size,
            total_size,
            "Using piece length of {}",
            PieceSize::from_bytes(piece_length).unwrap_or(self.options.piece_size)
        );

        let pb = self.progress_bar(total_size);
        let digests = hash_catalog(&mut files, piece_length, pb.as_ref())?;
        if let Some(pb) = pb {
            pb.finish_with_message("Hashing complete");
        }

        let metadata = assemble(
            &self.options.announce,
            &name,
            piece_length,
            &digests,
            files,
            created_at,
        )?;
        info!(
            name = %metadata.name,
            files = metadata.files.len(),
            pieces = metadata.piece_count(),
            "Torrent assembled"
        );
        Ok(metadata)
    }

    /// Build and bencode the torrent
    pub fn create(&self) -> Result<Vec<u8>> {
        self.build()?.to_bytes()
    }

    /// Build the torrent and write it to `output`.
    ///
    /// The output directory is checked before any hashing starts, and `output`
    /// itself is left out of the scan. The encoded metainfo is staged in a
    /// temporary file next to `output` and renamed into place, so a failed
    /// write never leaves a truncated torrent or clobbers an existing one.
    pub fn create_file(&self, output: &Path, overwrite: bool) -> Result<TorrentMetadata> {
        let parent = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(Error::PathNotFound(parent.to_path_buf()));
        }
        if !overwrite && output.exists() {
            return Err(Error::io(
                output,
                io::Error::new(ErrorKind::AlreadyExists, "output file already exists"),
            ));
        }

        let metadata = self.build_excluding(Some(output))?;
        let bytes = metadata.to_bytes()?;

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
        staged
            .write_all(&bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| Error::io(output, e))?;
        let persisted = if overwrite {
            staged.persist(output)
        } else {
            staged.persist_noclobber(output)
        };
        persisted.map_err(|e| Error::io(output, e.error))?;

        debug!(path = %output.display(), bytes = bytes.len(), "Wrote torrent file");
        Ok(metadata)
    }

    fn progress_bar(&self, total_size: u64) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(total_size);
        pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.202/94} {bytes}/{total_bytes} ({eta}) {msg}",
        )
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Hashing...");
        Some(pb)
    }
}
