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

//! Contracts between the bundle runtime and its host.
//!
//! The runtime never interprets bundle bytes itself. The host supplies two
//! collaborators: a [`BundleStorage`] that turns a resolved file path into a
//! loaded bundle object, and a [`BundleData`] implementation per loaded
//! bundle that extracts named, typed assets from it. Both sides exchange
//! assets type-erased as [`ErasedAsset`]; the agent layer downcasts back to
//! the caller's concrete type.

use std::any::Any;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

/// A shared, type-erased asset as produced by the extraction bridge.
pub type ErasedAsset = Arc<dyn Any + Send + Sync>;

/// A loaded bundle object: a named archive of extractable assets.
///
/// Implementations own whatever the storage read produced and answer the two
/// extraction calls the runtime dispatches on [`AssetKind`]. Extraction
/// misses are `None`, never errors; a miss is a content problem the caller
/// handles, not an I/O failure.
///
/// [`AssetKind`]: crate::asset::AssetKind
pub trait BundleData: Send + Sync + 'static {
    /// Extracts an asset by direct name match. Returns `None` when no asset
    /// with that name exists in the bundle.
    fn asset(&self, name: &str) -> Option<ErasedAsset>;

    /// Extracts a packed-atlas texture by sub-asset name matching.
    fn atlas_sprite(&self, name: &str) -> Option<ErasedAsset>;

    /// Lists the names of every asset in the bundle.
    fn asset_names(&self) -> Vec<String>;
}

impl std::fmt::Debug for dyn BundleData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleData").finish_non_exhaustive()
    }
}

/// The storage-read collaborator: resolved path in, loaded bundle out.
///
/// Implementations are handed a single already-resolved file path; multi-root
/// addressing is the loading lane's job, not the storage's. A read may block.
pub trait BundleStorage: Send + Sync + 'static {
    /// Reads and materializes the bundle at `path`.
    ///
    /// # Errors
    /// Returns the underlying I/O or decode error when the file cannot be
    /// read or is not a valid bundle. The error must be thread-safe.
    fn read_bundle(&self, path: &Path) -> Result<Arc<dyn BundleData>, Box<dyn Error + Send + Sync>>;

    /// Reports whether a file exists at `path`, without loading it.
    fn exists(&self, path: &Path) -> bool;
}
