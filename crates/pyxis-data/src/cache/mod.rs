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

//! The reference-counted bundle cache.
//!
//! This module provides the [`BundleCache`], the single authority for which
//! bundles are resident. Every acquisition and release across the runtime
//! goes through it; no other component unloads a bundle it does not own the
//! last reference to. A bundle whose use-count reaches zero stays resident
//! until a forced release or a bulk teardown: reclamation is deliberately
//! lazy, trading memory for reload latency.

use pyxis_core::asset::{AssetKind, BundleKey};
use pyxis_core::bundle::{BundleData, ErasedAsset};
use std::collections::HashMap;
use std::sync::Arc;

/// The cache's wrapper around one loaded bundle: the bundle object plus the
/// use-count that decides when it may be unloaded.
pub struct BundleWrapper {
    data: Arc<dyn BundleData>,
    use_count: u32,
}

impl BundleWrapper {
    fn new(data: Arc<dyn BundleData>) -> Self {
        Self { data, use_count: 0 }
    }

    /// The loaded bundle object.
    pub fn data(&self) -> &Arc<dyn BundleData> {
        &self.data
    }

    /// How many acquisitions are outstanding. Zero means the bundle is
    /// eligible for unload, not that it has been unloaded.
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    fn mark_used(&mut self) {
        self.use_count += 1;
    }

    // Saturating: an over-release floors at zero rather than underflowing.
    fn release(&mut self) {
        self.use_count = self.use_count.saturating_sub(1);
    }

    /// Extracts a named asset from the bundle, dispatching on its kind.
    ///
    /// Atlas assets go through the sub-asset lookup; everything else is a
    /// direct name match, falling back to a contains-match when the bundle
    /// holds exactly one asset.
    pub fn extract(&self, name: &str, kind: AssetKind) -> Option<ErasedAsset> {
        match kind {
            AssetKind::Atlas => self.data.atlas_sprite(name),
            AssetKind::Generic => self.data.asset(name).or_else(|| {
                let names = self.data.asset_names();
                match names.as_slice() {
                    [only] if only.contains(name) => self.data.asset(only),
                    _ => None,
                }
            }),
        }
    }
}

/// Mapping from bundle key to resident [`BundleWrapper`].
///
/// The cache owns every wrapper exclusively. All mutation happens on the
/// driving thread through `&mut self`, so acquire/release sequences from
/// interleaved requests observe a consistent use-count, with no lost
/// increments.
#[derive(Default)]
pub struct BundleCache {
    bundles: HashMap<BundleKey, BundleWrapper>,
}

impl BundleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires an already resident bundle: increments its use-count and
    /// returns its data. Returns `None` on a cache miss; the caller is then
    /// responsible for performing the storage read and handing the result to
    /// [`Self::insert`]. A hit never re-reads from storage.
    pub fn checkout(&mut self, key: &BundleKey) -> Option<Arc<dyn BundleData>> {
        let wrapper = self.bundles.get_mut(key)?;
        wrapper.mark_used();
        Some(wrapper.data.clone())
    }

    /// Registers a freshly loaded bundle and counts one use for it.
    ///
    /// If the key is already resident (two in-flight requests raced on the
    /// same bundle), the existing wrapper wins: its count is incremented and
    /// the newly read data is dropped. The cache stays the single authority
    /// for load state.
    pub fn insert(&mut self, key: BundleKey, data: Arc<dyn BundleData>) -> Arc<dyn BundleData> {
        let wrapper = self
            .bundles
            .entry(key)
            .or_insert_with(|| BundleWrapper::new(data));
        wrapper.mark_used();
        wrapper.data.clone()
    }

    /// Read-only access to a resident wrapper, for extraction and inspection.
    pub fn get(&self, key: &BundleKey) -> Option<&BundleWrapper> {
        self.bundles.get(key)
    }

    /// Whether a bundle is currently resident, at any use-count.
    pub fn is_resident(&self, key: &BundleKey) -> bool {
        self.bundles.contains_key(key)
    }

    /// The number of resident bundles.
    pub fn resident(&self) -> usize {
        self.bundles.len()
    }

    /// Releases one use of a bundle.
    ///
    /// With `force = false` the use-count is decremented and the bundle stays
    /// resident even at zero. With `force = true` the bundle is evicted
    /// immediately regardless of its count.
    pub fn release(&mut self, key: &BundleKey, force: bool) {
        if force {
            if self.bundles.remove(key).is_some() {
                log::debug!("force-unloaded bundle '{key}'");
            }
        } else if let Some(wrapper) = self.bundles.get_mut(key) {
            wrapper.release();
        }
    }

    /// Bulk teardown: drops every resident bundle regardless of use-counts.
    ///
    /// Used only at full context teardown, e.g. a hot-update bundle switch.
    pub fn unload_all(&mut self) {
        let count = self.bundles.len();
        self.bundles.clear();
        if count > 0 {
            log::info!("unloaded all {count} resident bundles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory bundle with separately keyed generic assets and atlas
    /// sprites, mirroring the two extraction calls.
    struct StubBundle {
        assets: Vec<(String, u32)>,
        sprites: Vec<(String, u32)>,
    }

    impl StubBundle {
        fn with_assets(names: &[&str]) -> Arc<dyn BundleData> {
            Arc::new(Self {
                assets: names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (n.to_string(), i as u32))
                    .collect(),
                sprites: Vec::new(),
            })
        }

        fn with_sprites(names: &[&str]) -> Arc<dyn BundleData> {
            Arc::new(Self {
                assets: Vec::new(),
                sprites: names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (n.to_string(), i as u32))
                    .collect(),
            })
        }
    }

    impl BundleData for StubBundle {
        fn asset(&self, name: &str) -> Option<ErasedAsset> {
            self.assets
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| Arc::new(*v) as ErasedAsset)
        }

        fn atlas_sprite(&self, name: &str) -> Option<ErasedAsset> {
            self.sprites
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| Arc::new(*v) as ErasedAsset)
        }

        fn asset_names(&self) -> Vec<String> {
            self.assets.iter().map(|(n, _)| n.clone()).collect()
        }
    }

    fn key(raw: &str) -> BundleKey {
        BundleKey::new(raw)
    }

    #[test]
    fn test_checkout_misses_until_inserted() {
        let mut cache = BundleCache::new();
        assert!(cache.checkout(&key("ab_a")).is_none());

        cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));
        assert!(cache.checkout(&key("ab_a")).is_some());
    }

    #[test]
    fn test_use_count_tracks_acquires_and_releases() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));
        cache.checkout(&key("ab_a"));
        cache.checkout(&key("ab_a"));
        assert_eq!(cache.get(&key("ab_a")).unwrap().use_count(), 3);

        cache.release(&key("ab_a"), false);
        assert_eq!(cache.get(&key("ab_a")).unwrap().use_count(), 2);
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));

        for _ in 0..5 {
            cache.release(&key("ab_a"), false);
        }
        // Still resident at zero: reclamation is lazy.
        assert_eq!(cache.get(&key("ab_a")).unwrap().use_count(), 0);
        assert!(cache.is_resident(&key("ab_a")));
    }

    #[test]
    fn test_force_release_evicts_regardless_of_count() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));
        cache.checkout(&key("ab_a"));

        cache.release(&key("ab_a"), true);
        assert!(!cache.is_resident(&key("ab_a")));
    }

    #[test]
    fn test_racing_insert_reuses_resident_wrapper() {
        let mut cache = BundleCache::new();
        let first = cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));
        let second = cache.insert(key("ab_a"), StubBundle::with_assets(&["y"]));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.resident(), 1);
        assert_eq!(cache.get(&key("ab_a")).unwrap().use_count(), 2);
    }

    #[test]
    fn test_unload_all_clears_residency() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["x"]));
        cache.insert(key("ab_b"), StubBundle::with_assets(&["y"]));

        cache.unload_all();
        assert_eq!(cache.resident(), 0);
        assert!(cache.checkout(&key("ab_a")).is_none());
    }

    #[test]
    fn test_extract_generic_direct_match() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["ui/hud", "ui/icons"]));

        let wrapper = cache.get(&key("ab_a")).unwrap();
        assert!(wrapper.extract("ui/hud", AssetKind::Generic).is_some());
        assert!(wrapper.extract("ui/nope", AssetKind::Generic).is_none());
    }

    #[test]
    fn test_extract_generic_single_asset_fallback() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_a"), StubBundle::with_assets(&["assets/runtime/ui/hud.prefab"]));

        // Requested name is not an exact match, but the bundle holds exactly
        // one asset whose name contains it.
        let wrapper = cache.get(&key("ab_a")).unwrap();
        assert!(wrapper.extract("runtime/ui/hud", AssetKind::Generic).is_some());
    }

    #[test]
    fn test_extract_atlas_uses_sprite_lookup() {
        let mut cache = BundleCache::new();
        cache.insert(key("ab_atlas"), StubBundle::with_sprites(&["icons/sword"]));

        let wrapper = cache.get(&key("ab_atlas")).unwrap();
        assert!(wrapper.extract("icons/sword", AssetKind::Atlas).is_some());
        assert!(wrapper.extract("icons/sword", AssetKind::Generic).is_none());
    }
}
