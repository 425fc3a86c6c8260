// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The lane responsible for the I/O task of reading bundle files.
//!
//! A bundle key names a file, not a location: the same key may resolve under
//! the primary art directory (e.g. downloaded hot-update content) or fall
//! back to the secondary directory (content shipped with the build). This
//! lane encapsulates that multi-root addressing and the blocking read
//! through the [`BundleStorage`] collaborator. It performs no caching;
//! the cache above it decides whether a read happens at all.

use pyxis_core::asset::BundleKey;
use pyxis_core::bundle::{BundleData, BundleStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A failure while addressing or reading one bundle file.
#[derive(Debug, Error)]
pub enum BundleLaneError {
    /// The bundle file exists at neither search root.
    #[error("bundle '{key}' not found under '{primary}' or '{secondary}'")]
    NotFound {
        /// The bundle that could not be addressed.
        key: BundleKey,
        /// The primary search root.
        primary: PathBuf,
        /// The secondary search root.
        secondary: PathBuf,
    },
    /// The storage collaborator failed to read or materialize the file.
    #[error("storage read failed for bundle '{key}': {details}")]
    Storage {
        /// The bundle whose read failed.
        key: BundleKey,
        /// The storage error, flattened to text.
        details: String,
    },
}

/// A "Lane" that reads bundle files through two-root multi-addressing.
pub struct BundleLoadingLane {
    storage: Arc<dyn BundleStorage>,
    primary_root: PathBuf,
    secondary_root: PathBuf,
}

impl BundleLoadingLane {
    /// Creates a lane over the given storage and search roots.
    pub fn new<P, S>(storage: Arc<dyn BundleStorage>, primary_root: P, secondary_root: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<PathBuf>,
    {
        Self {
            storage,
            primary_root: primary_root.into(),
            secondary_root: secondary_root.into(),
        }
    }

    /// Resolves a key to a concrete file path: the primary root wins when
    /// the file exists there, otherwise the secondary path is returned
    /// whether or not anything exists at it.
    pub fn resolve_path(&self, key: &BundleKey) -> PathBuf {
        let primary = self.primary_root.join(key.as_str());
        if self.storage.exists(&primary) {
            primary
        } else {
            log::debug!("bundle '{key}' not at primary root, trying secondary");
            self.secondary_root.join(key.as_str())
        }
    }

    /// Addresses and reads one bundle. Blocks until the storage read
    /// completes.
    ///
    /// # Errors
    /// [`BundleLaneError::NotFound`] when the file exists at neither root;
    /// [`BundleLaneError::Storage`] when the read itself fails. Neither is
    /// retried.
    pub fn load(&self, key: &BundleKey) -> Result<Arc<dyn BundleData>, BundleLaneError> {
        let path = self.resolve_path(key);
        if !self.storage.exists(&path) {
            return Err(BundleLaneError::NotFound {
                key: key.clone(),
                primary: self.primary_root.clone(),
                secondary: self.secondary_root.clone(),
            });
        }

        self.storage
            .read_bundle(&path)
            .map_err(|err| BundleLaneError::Storage {
                key: key.clone(),
                details: err.to_string(),
            })
    }

    /// The primary search root.
    pub fn primary_root(&self) -> &Path {
        &self.primary_root
    }

    /// The secondary search root.
    pub fn secondary_root(&self) -> &Path {
        &self.secondary_root
    }
}
