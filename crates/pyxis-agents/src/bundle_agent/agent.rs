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

//! The BundleAgent is responsible for asset retrieval and bundle residency.

use crate::bundle_agent::scheduler::{LoadScheduler, TaskGroup};
use anyhow::{Context, Result};
use pyxis_core::asset::{Asset, AssetHandle, BundleKey};
use pyxis_core::bundle::{BundleData, BundleStorage, ErasedAsset};
use pyxis_core::LoadError;
use pyxis_data::{BundleCache, BundleCatalog};
use pyxis_lanes::BundleLoadingLane;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Completion callback of one asynchronous load: receives the group's final
/// progress in `0.0..=1.0` and the extracted asset, or `None` on failure.
pub type LoadCallback = Box<dyn FnOnce(f32, Option<ErasedAsset>) + Send>;

type BatchComplete = Box<dyn FnOnce(HashMap<String, Option<ErasedAsset>>) + Send>;

/// Shared accumulator of one batch request: the name→asset map plus the
/// one-shot aggregate callback.
struct BatchState {
    loaded: HashMap<String, Option<ErasedAsset>>,
    on_complete: Option<BatchComplete>,
}

/// The public facade of the bundle runtime.
///
/// The agent owns the catalog, the reference-counted bundle cache, the
/// loading lane, and the serialized load scheduler. All state is instance
/// state: independent agents (and tests) are fully isolated from each other.
///
/// The host loop must call [`Self::update`] once per frame to drive
/// asynchronous requests; the synchronous [`Self::load`] blocks the caller
/// on storage reads instead.
pub struct BundleAgent {
    catalog: BundleCatalog,
    cache: BundleCache,
    lane: Arc<BundleLoadingLane>,
    scheduler: LoadScheduler,
    next_task_id: i32,
}

impl BundleAgent {
    /// Creates a new `BundleAgent` over a serialized catalog index, a
    /// storage collaborator, and the two bundle search roots.
    ///
    /// # Errors
    /// Fails when the index bytes do not decode or the I/O worker cannot be
    /// spawned.
    pub fn new<P, S>(
        index_bytes: &[u8],
        storage: Arc<dyn BundleStorage>,
        primary_root: P,
        secondary_root: S,
    ) -> Result<Self>
    where
        P: Into<PathBuf>,
        S: Into<PathBuf>,
    {
        let catalog =
            BundleCatalog::new(index_bytes).context("Failed to decode the bundle catalog index")?;
        let lane = Arc::new(BundleLoadingLane::new(
            storage,
            primary_root.into(),
            secondary_root.into(),
        ));
        let scheduler =
            LoadScheduler::new(lane.clone()).context("Failed to spawn the bundle I/O worker")?;

        log::info!("bundle agent initialized with {} catalog entries", catalog.len());

        Ok(Self {
            catalog,
            cache: BundleCache::new(),
            lane,
            scheduler,
            next_task_id: 0,
        })
    }

    /// Synchronously loads and extracts a typed asset.
    ///
    /// Resolves the name, acquires each dependency bundle in listed order,
    /// then the main bundle, blocking on any storage reads, and extracts the
    /// asset. Every failure (unknown name, missing bundle file, extraction
    /// miss, type mismatch) is logged and surfaces as `None`.
    pub fn load<T: Asset>(&mut self, name: &str) -> Option<AssetHandle<T>> {
        match self.try_load_erased(name) {
            Ok(asset) => match asset.downcast::<T>() {
                Ok(typed) => Some(AssetHandle::from_arc(typed)),
                Err(_) => {
                    log::error!("asset '{name}' is not of the requested type");
                    None
                }
            },
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    /// Enqueues an asynchronous load and returns its task id, usable with
    /// [`Self::cancel`]. Returns `-1` without enqueuing anything when the
    /// name does not resolve.
    ///
    /// The callback fires on the driving thread, from [`Self::update`], with
    /// `None` when the load or the extraction failed or the asset is not of
    /// the requested type.
    pub fn load_async<T, F>(&mut self, name: &str, on_complete: F) -> i32
    where
        T: Asset,
        F: FnOnce(Option<AssetHandle<T>>) + Send + 'static,
    {
        self.load_async_erased(
            name,
            Box::new(move |_progress, asset| {
                let handle = asset
                    .and_then(|asset| asset.downcast::<T>().ok())
                    .map(AssetHandle::from_arc);
                on_complete(handle);
            }),
        )
    }

    /// Type-erased variant of [`Self::load_async`], for callers that do not
    /// know the concrete asset type at the request site.
    pub fn load_async_erased(&mut self, name: &str, on_complete: LoadCallback) -> i32 {
        let Some(record) = self.catalog.resolve(name).cloned() else {
            log::error!(
                "{}",
                LoadError::AssetNotFound {
                    name: name.to_string(),
                }
            );
            return -1;
        };

        let id = self.next_task_id;
        self.next_task_id += 1;
        self.scheduler.enqueue(TaskGroup::new(id, record, on_complete));
        // Kick the queue so an idle lane starts the group right away.
        self.scheduler.update(&mut self.cache);
        id
    }

    /// Asynchronously loads a batch of assets.
    ///
    /// The names are de-duplicated; each unique name becomes one
    /// single-asset request. `on_progress` fires after every individual
    /// completion with `(completed, total)`; `on_complete` fires exactly
    /// once, when every request has finished, with the full name→asset map.
    /// Returns the task ids of the individual requests.
    pub fn load_batch<P, C>(&mut self, names: &[&str], on_progress: P, on_complete: C) -> Vec<i32>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
        C: FnOnce(HashMap<String, Option<ErasedAsset>>) + Send + 'static,
    {
        let mut unique: Vec<&str> = Vec::new();
        for &name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        let total = unique.len();

        let accumulator = Arc::new(Mutex::new(BatchState {
            loaded: HashMap::new(),
            on_complete: Some(Box::new(on_complete)),
        }));
        let on_progress = Arc::new(on_progress);

        let mut task_ids = Vec::with_capacity(total);
        for name in unique {
            let owned = name.to_string();
            let accumulator = accumulator.clone();
            let on_progress = on_progress.clone();

            let id = self.load_async_erased(
                name,
                Box::new(move |_progress, asset| {
                    // Take the aggregate callback inside the lock, invoke it
                    // outside, so user code never runs under the mutex.
                    let finisher = {
                        let Ok(mut state) = accumulator.lock() else {
                            return;
                        };
                        state.loaded.insert(owned, asset);
                        on_progress(state.loaded.len(), total);
                        if state.loaded.len() == total {
                            state
                                .on_complete
                                .take()
                                .map(|callback| (callback, std::mem::take(&mut state.loaded)))
                        } else {
                            None
                        }
                    };
                    if let Some((callback, loaded)) = finisher {
                        callback(loaded);
                    }
                }),
            );
            task_ids.push(id);
        }

        task_ids
    }

    /// Cancels one asynchronous load. A queued group is evicted silently; a
    /// running group stops without firing its callback. Unknown ids no-op.
    pub fn cancel(&mut self, task_id: i32) {
        self.scheduler.cancel(task_id);
    }

    /// Cancels every queued and running asynchronous load.
    pub fn cancel_all(&mut self) {
        self.scheduler.cancel_all();
    }

    /// The per-frame drive step: rejoins finished storage reads, fires due
    /// completion callbacks, and starts the next queued group.
    pub fn update(&mut self) {
        self.scheduler.update(&mut self.cache);
    }

    /// Releases one use of an asset's bundles: its dependencies and then its
    /// main bundle. With `force` the bundles are evicted immediately;
    /// otherwise the counts decrement and zero-count bundles stay resident
    /// until [`Self::unload_all`].
    pub fn unload(&mut self, name: &str, force: bool) {
        let Some(record) = self.catalog.resolve(name).cloned() else {
            log::warn!(
                "{}",
                LoadError::AssetNotFound {
                    name: name.to_string(),
                }
            );
            return;
        };

        for dependency in &record.dependencies {
            self.cache.release(dependency, force);
        }
        self.cache.release(&record.bundle, force);
    }

    /// Unloads every resident bundle regardless of use-counts. Used at full
    /// context teardown, e.g. switching to a new hot-update bundle set.
    pub fn unload_all(&mut self) {
        self.cache.unload_all();
    }

    /// Lists catalog load paths under a folder, optionally filtered by a
    /// filename prefix.
    pub fn assets_in(&self, folder: &str, pattern: Option<&str>) -> Vec<String> {
        self.catalog.assets_in(folder, pattern)
    }

    /// The catalog this agent resolves names against.
    pub fn catalog(&self) -> &BundleCatalog {
        &self.catalog
    }

    /// The use-count of a resident bundle, or `None` when it is not
    /// resident.
    pub fn use_count(&self, key: &BundleKey) -> Option<u32> {
        self.cache.get(key).map(|wrapper| wrapper.use_count())
    }

    /// Whether a bundle is currently resident in the cache.
    pub fn is_resident(&self, key: &BundleKey) -> bool {
        self.cache.is_resident(key)
    }

    /// The number of resident bundles.
    pub fn resident_bundles(&self) -> usize {
        self.cache.resident()
    }

    /// The number of asynchronous groups queued or actively advancing.
    pub fn queued_tasks(&self) -> usize {
        self.scheduler.queued()
    }

    fn try_load_erased(&mut self, name: &str) -> Result<ErasedAsset, LoadError> {
        let record = self
            .catalog
            .resolve(name)
            .cloned()
            .ok_or_else(|| LoadError::AssetNotFound {
                name: name.to_string(),
            })?;

        // Dependencies first, in listed order, then the main bundle.
        for dependency in &record.dependencies {
            self.acquire(dependency)?;
        }
        self.acquire(&record.bundle)?;

        self.cache
            .get(&record.bundle)
            .and_then(|wrapper| wrapper.extract(&record.load_path, record.kind))
            .ok_or(LoadError::AssetNotFound {
                name: record.load_path,
            })
    }

    /// Acquires one bundle through the cache: a hit counts a use without
    /// touching storage, a miss blocks on the lane and registers the result.
    fn acquire(&mut self, key: &BundleKey) -> Result<Arc<dyn BundleData>, LoadError> {
        if let Some(data) = self.cache.checkout(key) {
            return Ok(data);
        }

        let data = self
            .lane
            .load(key)
            .map_err(|err| LoadError::BundleLoadFailure {
                bundle: key.clone(),
                details: err.to_string(),
            })?;
        Ok(self.cache.insert(key.clone(), data))
    }
}
