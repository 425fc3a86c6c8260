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

use super::BundleKey;
use serde::{Deserialize, Serialize};

/// The extraction path an asset requires once its bundle is resident.
///
/// This is a deliberately closed, two-way dispatch: packed atlases are the
/// one asset family whose extraction call differs (sub-asset lookup instead
/// of a direct name match), and everything else takes the generic path. New
/// families would be new variants, not an open type switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    /// A texture packed into a sprite atlas; extracted by sub-asset name.
    Atlas,
    /// Any other asset; extracted by direct name match.
    Generic,
}

/// Serializable catalog entry that describes one logical asset.
///
/// This structure contains all the information the catalog and the bundle
/// agent need to locate, load, and extract an asset without touching the
/// bundle data itself. It is immutable after the index is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    /// The logical load path callers use to request the asset. In
    /// debug-runtime naming mode this carries the `runtime/` prefix.
    pub load_path: String,

    /// The bundle that owns the asset's data.
    pub bundle: BundleKey,

    /// Which extraction path the asset takes.
    pub kind: AssetKind,

    /// Bundles that must be resident before [`Self::bundle`] is loaded,
    /// in acquisition order. May be empty.
    pub dependencies: Vec<BundleKey>,
}
