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

//! Shared test fixtures: a text-asset bundle format written to real files,
//! and a storage collaborator that records every read it performs.

#![allow(dead_code)]

use pyxis_core::asset::{Asset, AssetKind, AssetRecord, BundleKey};
use pyxis_core::bundle::{BundleData, BundleStorage, ErasedAsset};
use pyxis_data::CatalogIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The dummy asset every test bundle carries.
#[derive(Debug, PartialEq)]
pub struct TextAsset {
    pub text: String,
}

impl Asset for TextAsset {}

/// On-disk form of a test bundle: generic assets and atlas sprites, both
/// name→text.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TestBundleFile {
    pub assets: HashMap<String, String>,
    pub sprites: HashMap<String, String>,
}

struct TestBundle {
    file: TestBundleFile,
}

impl BundleData for TestBundle {
    fn asset(&self, name: &str) -> Option<ErasedAsset> {
        self.file.assets.get(name).map(|text| {
            Arc::new(TextAsset { text: text.clone() }) as ErasedAsset
        })
    }

    fn atlas_sprite(&self, name: &str) -> Option<ErasedAsset> {
        self.file.sprites.get(name).map(|text| {
            Arc::new(TextAsset { text: text.clone() }) as ErasedAsset
        })
    }

    fn asset_names(&self) -> Vec<String> {
        self.file.assets.keys().cloned().collect()
    }
}

/// File-backed storage that decodes [`TestBundleFile`]s and logs every read,
/// optionally sleeping first to keep async groups in flight.
pub struct TestStorage {
    pub reads: Mutex<Vec<PathBuf>>,
    pub delay: Duration,
}

impl TestStorage {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reads: Mutex::new(Vec::new()),
            delay,
        })
    }

    /// How many reads hit a path ending in `bundle_file`.
    pub fn reads_of(&self, bundle_file: &str) -> usize {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|path| path.file_name().is_some_and(|f| f == bundle_file))
            .count()
    }

    /// The file names read so far, in order.
    pub fn read_order(&self) -> Vec<String> {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter_map(|path| path.file_name())
            .map(|f| f.to_string_lossy().into_owned())
            .collect()
    }
}

impl BundleStorage for TestStorage {
    fn read_bundle(&self, path: &Path) -> Result<Arc<dyn BundleData>, Box<dyn Error + Send + Sync>> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.reads.lock().unwrap().push(path.to_path_buf());

        let bytes = std::fs::read(path)?;
        let config = bincode::config::standard();
        let (file, _): (TestBundleFile, _) = bincode::serde::decode_from_slice(&bytes, config)?;
        Ok(Arc::new(TestBundle { file }))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Writes a bundle file named `key` under `root`.
pub fn write_bundle(root: &Path, key: &str, assets: &[(&str, &str)], sprites: &[(&str, &str)]) {
    let file = TestBundleFile {
        assets: assets
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        sprites: sprites
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
    };
    let config = bincode::config::standard();
    let bytes = bincode::serde::encode_to_vec(&file, config).unwrap();
    std::fs::write(root.join(key), bytes).unwrap();
}

pub fn record(load_path: &str, bundle: &str, kind: AssetKind, deps: &[&str]) -> AssetRecord {
    AssetRecord {
        load_path: load_path.to_string(),
        bundle: BundleKey::new(bundle),
        kind,
        dependencies: deps.iter().map(|d| BundleKey::new(d)).collect(),
    }
}

/// Encodes a catalog index the way the build pipeline would.
pub fn encode_index(hashed_names: bool, records: Vec<AssetRecord>) -> Vec<u8> {
    let config = bincode::config::standard();
    bincode::serde::encode_to_vec(CatalogIndex { hashed_names, records }, config).unwrap()
}
