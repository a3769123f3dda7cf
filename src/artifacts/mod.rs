// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Artifact store
//!
//! Keeps a copy of a run's output directory for a retention period.
//! Layout: `<root>/<name>/<run_id>/{manifest.json, files/...}`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ScrapeflowError;
use crate::state::{hash_file, list_files};

const MANIFEST_FILE: &str = "manifest.json";
const FILES_DIR: &str = "files";

/// Description of one stored artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub name: String,
    pub workflow: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub files: Vec<ArtifactFile>,
}

/// One file inside an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// Path relative to the uploaded directory
    pub path: String,
    pub size: u64,
    pub blake3: String,
}

impl ArtifactManifest {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        self.expires_at <= *now
    }
}

/// Parameters of an upload
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub name: &'a str,
    pub source: &'a Path,
    pub retention_days: u32,
    pub workflow: &'a str,
    pub run_id: &'a str,
    pub now: DateTime<Utc>,
}

/// Filesystem artifact store
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `source` (a directory or a single file) into the store
    pub fn upload(&self, request: &UploadRequest<'_>) -> Result<ArtifactManifest, ScrapeflowError> {
        if request.name.is_empty() || request.name.contains(['/', '\\']) || request.name.starts_with('.') {
            return Err(ScrapeflowError::Artifact {
                message: format!("Invalid artifact name '{}'", request.name),
            });
        }

        if !request.source.exists() {
            return Err(ScrapeflowError::FileNotFound {
                path: request.source.to_path_buf(),
                help: Some("The artifact path must exist when the step runs".into()),
            });
        }

        let (base, sources) = if request.source.is_dir() {
            (request.source.to_path_buf(), list_files(request.source)?)
        } else {
            let parent = request.source.parent().unwrap_or(Path::new(".")).to_path_buf();
            (parent, vec![request.source.to_path_buf()])
        };

        let target = self.root.join(request.name).join(request.run_id);
        let files_dir = target.join(FILES_DIR);
        std::fs::create_dir_all(&files_dir).map_err(|e| ScrapeflowError::Artifact {
            message: format!("Failed to create {}: {}", files_dir.display(), e),
        })?;

        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            let relative = source.strip_prefix(&base).unwrap_or(&source).to_path_buf();
            let dest = files_dir.join(&relative);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let size = std::fs::copy(&source, &dest).map_err(|e| ScrapeflowError::FileWriteError {
                path: dest.clone(),
                error: e.to_string(),
            })?;

            files.push(ArtifactFile {
                path: relative.to_string_lossy().replace('\\', "/"),
                size,
                blake3: hash_file(&dest)?,
            });
        }

        let manifest = ArtifactManifest {
            name: request.name.to_string(),
            workflow: request.workflow.to_string(),
            run_id: request.run_id.to_string(),
            created_at: request.now,
            expires_at: request.now + Duration::days(i64::from(request.retention_days)),
            files,
        };

        let manifest_path = target.join(MANIFEST_FILE);
        std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?).map_err(|e| {
            ScrapeflowError::FileWriteError {
                path: manifest_path.clone(),
                error: e.to_string(),
            }
        })?;

        tracing::info!(
            "Uploaded artifact '{}' ({} files) to {}",
            manifest.name,
            manifest.files.len(),
            target.display()
        );

        Ok(manifest)
    }

    /// Every readable manifest with its directory, newest first
    pub fn list(&self) -> Result<Vec<(PathBuf, ArtifactManifest)>, ScrapeflowError> {
        let mut artifacts = Vec::new();

        if !self.root.exists() {
            return Ok(artifacts);
        }

        let pattern = self.root.join("*").join("*").join(MANIFEST_FILE);
        for path in glob::glob(&pattern.to_string_lossy())?.filter_map(Result::ok) {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<ArtifactManifest>(&content) {
                Ok(manifest) => {
                    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                    artifacts.push((dir, manifest));
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        artifacts.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(artifacts)
    }

    /// Delete artifacts whose retention has elapsed
    pub fn prune_expired(&self, now: &DateTime<Utc>) -> Result<Vec<ArtifactManifest>, ScrapeflowError> {
        let mut removed = Vec::new();

        for (dir, manifest) in self.list()? {
            if !manifest.is_expired(now) {
                continue;
            }

            std::fs::remove_dir_all(&dir).map_err(|e| ScrapeflowError::Artifact {
                message: format!("Failed to remove {}: {}", dir.display(), e),
            })?;

            // Drop the per-name directory once it is empty
            if let Some(parent) = dir.parent() {
                if std::fs::read_dir(parent).map(|mut d| d.next().is_none()).unwrap_or(false) {
                    let _ = std::fs::remove_dir(parent);
                }
            }

            tracing::info!("Pruned expired artifact {}/{}", manifest.name, manifest.run_id);
            removed.push(manifest);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request<'a>(name: &'a str, source: &'a Path, run_id: &'a str, now: DateTime<Utc>) -> UploadRequest<'a> {
        UploadRequest {
            name,
            source,
            retention_days: 30,
            workflow: "ac-scrape",
            run_id,
            now,
        }
    }

    #[test]
    fn test_upload_copies_tree_and_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ac_data");
        std::fs::create_dir_all(data.join("old")).unwrap();
        std::fs::write(data.join("2025-05-01_fangraphs_batters.csv"), "date,Name\n").unwrap();
        std::fs::write(data.join("old/notes.txt"), "hi").unwrap();

        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 16, 5, 0).unwrap();
        let manifest = store.upload(&request("ac-data", &data, "run-1", now)).unwrap();

        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[1].path, "old/notes.txt");
        assert_eq!(manifest.total_size(), 12);
        assert_eq!(manifest.expires_at, Utc.with_ymd_and_hms(2025, 5, 31, 16, 5, 0).unwrap());
        assert!(store.root().join("ac-data/run-1/files/old/notes.txt").exists());

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].1.run_id, "run-1");
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ac_data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("a.csv"), "x").unwrap();

        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let old = Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2025, 4, 20, 16, 0, 0).unwrap();
        store.upload(&request("ac-data", &data, "old", old)).unwrap();
        store.upload(&request("ac-data", &data, "recent", recent)).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let removed = store.prune_expired(&now).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].run_id, "old");

        let remaining: Vec<_> = store.list().unwrap().into_iter().map(|(_, m)| m.run_id).collect();
        assert_eq!(remaining, vec!["recent"]);
    }

    #[test]
    fn test_upload_rejects_missing_source_and_bad_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let now = Utc::now();

        let missing = dir.path().join("absent");
        assert!(store.upload(&request("ac-data", &missing, "r", now)).is_err());
        assert!(store.upload(&request("../escape", dir.path(), "r", now)).is_err());
    }
}
