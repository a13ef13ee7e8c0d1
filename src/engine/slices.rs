// Stateless Decode Harness - Slice Loader
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub const DEFAULT_SLICES_FORMAT: &str = "slice-%d.dump";

const PLACEHOLDER: &str = "%d";

/// Directory of per-frame slice dumps named after a `%d` pattern.
#[derive(Debug, Clone)]
pub struct SliceDirectory {
    path: PathBuf,
    format: String,
}

impl SliceDirectory {
    pub fn new(path: impl Into<PathBuf>, format: &str) -> Result<Self, PipelineError> {
        if format.matches(PLACEHOLDER).count() != 1 {
            return Err(PipelineError::SliceFormat {
                format: format.to_string(),
            });
        }
        Ok(Self {
            path: path.into(),
            format: format.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn file_for(&self, index: usize) -> PathBuf {
        self.path
            .join(self.format.replacen(PLACEHOLDER, &index.to_string(), 1))
    }

    pub async fn load(&self, index: usize) -> Result<Vec<u8>, PipelineError> {
        let path = self.file_for(index);
        tokio::fs::read(&path)
            .await
            .map_err(|source| PipelineError::Slice { path, source })
    }
}
