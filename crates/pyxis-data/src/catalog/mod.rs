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

//! The bundle catalog: fast, in-memory resolution of logical asset names.
//!
//! This module provides the [`BundleCatalog`] struct, which loads an index of
//! asset records once and answers O(1) lookups from a logical load path to
//! the owning bundle and its ordered dependency list. The catalog is the
//! primary source of truth for the bundle agent when it needs to decide what
//! to load; it never touches bundle data itself.

use pyxis_core::asset::AssetRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Fixed prefix applied to lookups in debug-runtime naming mode, where
/// bundle names are path-derived instead of content hashes and all runtime
/// assets sit under one folder for easy debugging.
const DEBUG_RUNTIME_PREFIX: &str = "runtime/";

/// The serialized form of the catalog, as produced by the build pipeline.
///
/// The index is bincode-encoded (standard config, serde mode) and loaded
/// exactly once at initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogIndex {
    /// Whether bundle filenames are content hashes. When `false`, lookups
    /// are prefixed with `runtime/` (debug-runtime naming mode).
    pub hashed_names: bool,
    /// Every asset the build produced, in no particular order.
    pub records: Vec<AssetRecord>,
}

/// The runtime representation of the asset index.
///
/// Immutable after construction. Lookups are case-insensitive: both the
/// stored load paths and the queried names are normalized to lowercase.
#[derive(Debug)]
pub struct BundleCatalog {
    hashed_names: bool,
    records: Vec<AssetRecord>,
    by_path: HashMap<String, usize>,
}

impl BundleCatalog {
    /// Creates a catalog by decoding a serialized [`CatalogIndex`].
    ///
    /// # Errors
    /// Returns a `DecodeError` if the byte slice is not a valid,
    /// bincode-encoded index.
    pub fn new(index_bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let config = bincode::config::standard();
        let (index, _): (CatalogIndex, _) = bincode::serde::decode_from_slice(index_bytes, config)?;
        Ok(Self::from_index(index))
    }

    /// Creates a catalog from an already decoded index.
    pub fn from_index(index: CatalogIndex) -> Self {
        let by_path = index
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.load_path.to_ascii_lowercase(), i))
            .collect();

        Self {
            hashed_names: index.hashed_names,
            records: index.records,
            by_path,
        }
    }

    /// Whether the index was built in hash-name mode.
    pub fn hashed_names(&self) -> bool {
        self.hashed_names
    }

    /// The number of assets in the catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no assets at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalizes a caller-facing name into the catalog's key space:
    /// lowercase, with the debug-runtime prefix applied when the index was
    /// not built with hashed names.
    fn normalize(&self, name: &str) -> String {
        let lowered = name.to_ascii_lowercase();
        if self.hashed_names {
            lowered
        } else {
            format!("{DEBUG_RUNTIME_PREFIX}{lowered}")
        }
    }

    /// Resolves a logical asset name to its record.
    ///
    /// The record carries the owning bundle and the ordered dependency list
    /// the caller must acquire first. A miss returns `None` and is not a
    /// fault: callers log it and surface an empty result downstream.
    pub fn resolve(&self, name: &str) -> Option<&AssetRecord> {
        let key = self.normalize(name);
        self.by_path.get(&key).map(|&i| &self.records[i])
    }

    /// Lists the load paths of every asset under `folder`, optionally
    /// filtered to filenames starting with `pattern` (case-insensitive).
    ///
    /// In debug-runtime mode the internal `runtime/` prefix is stripped from
    /// the returned paths, so output names match what callers pass to
    /// [`Self::resolve`].
    pub fn assets_in(&self, folder: &str, pattern: Option<&str>) -> Vec<String> {
        let prefix = self.normalize(&format!("{}/", folder.trim_end_matches('/')));

        let mut paths: Vec<&str> = self
            .records
            .iter()
            .filter(|record| record.load_path.to_ascii_lowercase().starts_with(&prefix))
            .map(|record| record.load_path.as_str())
            .collect();

        if let Some(pattern) = pattern {
            let pattern = pattern.to_ascii_lowercase();
            paths.retain(|path| {
                Path::new(path)
                    .file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|f| f.to_ascii_lowercase().starts_with(&pattern))
            });
        }

        paths
            .into_iter()
            .map(|path| {
                if self.hashed_names {
                    path.to_string()
                } else {
                    path[DEBUG_RUNTIME_PREFIX.len()..].to_string()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyxis_core::asset::{AssetKind, BundleKey};

    fn record(load_path: &str, bundle: &str, deps: &[&str]) -> AssetRecord {
        AssetRecord {
            load_path: load_path.to_string(),
            bundle: BundleKey::new(bundle),
            kind: AssetKind::Generic,
            dependencies: deps.iter().map(|d| BundleKey::new(d)).collect(),
        }
    }

    fn debug_index() -> CatalogIndex {
        CatalogIndex {
            hashed_names: false,
            records: vec![
                record("runtime/ui/hud", "ab_hud", &["ab_font", "ab_shared"]),
                record("runtime/ui/icons", "ab_icons", &[]),
                record("runtime/char/hero", "ab_hero", &["ab_shared"]),
            ],
        }
    }

    #[test]
    fn test_decode_from_index_bytes() {
        let config = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(debug_index(), config).unwrap();

        let catalog = BundleCatalog::new(&bytes).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.hashed_names());
    }

    #[test]
    fn test_resolve_applies_debug_prefix() {
        let catalog = BundleCatalog::from_index(debug_index());

        let found = catalog.resolve("ui/hud").unwrap();
        assert_eq!(found.bundle, BundleKey::new("ab_hud"));
        assert_eq!(
            found.dependencies,
            vec![BundleKey::new("ab_font"), BundleKey::new("ab_shared")]
        );
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let catalog = BundleCatalog::from_index(debug_index());
        assert!(catalog.resolve("UI/Hud").is_some());
    }

    #[test]
    fn test_resolve_miss_returns_none() {
        let catalog = BundleCatalog::from_index(debug_index());
        assert!(catalog.resolve("ui/does-not-exist").is_none());
    }

    #[test]
    fn test_hashed_mode_skips_prefix() {
        let catalog = BundleCatalog::from_index(CatalogIndex {
            hashed_names: true,
            records: vec![record("ui/hud", "1f9a00c3", &[])],
        });
        assert!(catalog.resolve("ui/hud").is_some());
    }

    #[test]
    fn test_assets_in_lists_and_strips_prefix() {
        let catalog = BundleCatalog::from_index(debug_index());

        let mut all = catalog.assets_in("ui", None);
        all.sort();
        assert_eq!(all, vec!["ui/hud".to_string(), "ui/icons".to_string()]);
    }

    #[test]
    fn test_assets_in_filters_by_filename_prefix() {
        let catalog = BundleCatalog::from_index(debug_index());
        assert_eq!(catalog.assets_in("ui", Some("IC")), vec!["ui/icons".to_string()]);
        assert!(catalog.assets_in("ui", Some("zzz")).is_empty());
    }
}
