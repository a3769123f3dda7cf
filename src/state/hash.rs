// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Content hashing
//!
//! Uses BLAKE3 for artifact digests and data-directory fingerprints.

use blake3::Hasher;
use std::path::{Path, PathBuf};

use crate::errors::ScrapeflowError;

/// Incremental content hasher
pub struct ContentHasher {
    hasher: Hasher,
}

impl ContentHasher {
    /// Create a new content hasher
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Hash every file below `dir`, path and contents, in sorted order
    pub fn hash_tree(&mut self, dir: &Path) -> Result<(), ScrapeflowError> {
        for file in list_files(dir)? {
            let relative = file.strip_prefix(dir).unwrap_or(&file);
            self.hasher.update(relative.to_string_lossy().as_bytes());
            self.hash_file(&file)?;
        }
        Ok(())
    }

    /// Hash a single file's contents
    pub fn hash_file(&mut self, path: &Path) -> Result<(), ScrapeflowError> {
        let content = std::fs::read(path).map_err(|e| ScrapeflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        self.hasher.update(&content);
        Ok(())
    }

    /// Hash arbitrary bytes
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finalize and get the hash
    pub fn finalize(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute hash of a file
pub fn hash_file(path: &Path) -> Result<String, ScrapeflowError> {
    let mut hasher = ContentHasher::new();
    hasher.hash_file(path)?;
    Ok(hasher.finalize())
}

/// Fingerprint a directory tree; `None` when it does not exist
pub fn fingerprint_dir(dir: &Path) -> Result<Option<String>, ScrapeflowError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut hasher = ContentHasher::new();
    hasher.hash_tree(dir)?;
    Ok(Some(hasher.finalize()))
}

/// Regular files below `dir`, sorted
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScrapeflowError> {
    let pattern = dir.join("**").join("*");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    // Sort for consistent ordering
    files.sort();
    Ok(files)
}
