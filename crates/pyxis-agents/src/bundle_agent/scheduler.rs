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

//! The serialized load scheduler.
//!
//! Task groups queue in FIFO order and at most one advances at a time. Each
//! group works through its tasks strictly in order: a task whose bundle is
//! already resident completes immediately through the cache; a miss is
//! dispatched to the single I/O worker thread, and the group suspends until
//! the worker posts the result back over the channel. Completions are
//! drained in [`LoadScheduler::update`] rather than chained recursively, so
//! long queues never deepen the call stack.

use crate::bundle_agent::agent::LoadCallback;
use crossbeam_channel::{unbounded, Receiver, Sender};
use pyxis_core::asset::{AssetRecord, BundleKey};
use pyxis_core::bundle::BundleData;
use pyxis_core::LoadError;
use pyxis_data::BundleCache;
use pyxis_lanes::{BundleLaneError, BundleLoadingLane};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One sub-load of a task group: a single bundle to make resident.
struct LoadTask {
    bundle: BundleKey,
    is_main: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    Pending,
    Running,
    Complete,
    Cancelled,
}

/// One logical asynchronous load request, decomposed into ordered sub-loads:
/// dependency bundles first, the main bundle last.
pub(crate) struct TaskGroup {
    id: i32,
    record: AssetRecord,
    tasks: VecDeque<LoadTask>,
    total: usize,
    completed: usize,
    state: GroupState,
    on_complete: Option<LoadCallback>,
}

impl TaskGroup {
    pub(crate) fn new(id: i32, record: AssetRecord, on_complete: LoadCallback) -> Self {
        let mut tasks: VecDeque<LoadTask> = record
            .dependencies
            .iter()
            .cloned()
            .map(|bundle| LoadTask {
                bundle,
                is_main: false,
            })
            .collect();
        tasks.push_back(LoadTask {
            bundle: record.bundle.clone(),
            is_main: true,
        });
        let total = tasks.len();

        Self {
            id,
            record,
            tasks,
            total,
            completed: 0,
            state: GroupState::Pending,
            on_complete: Some(on_complete),
        }
    }

    fn progress(&self) -> f32 {
        self.completed as f32 / self.total as f32
    }
}

/// A storage read handed to the I/O worker.
struct ReadRequest {
    group_id: i32,
    key: BundleKey,
}

/// A finished storage read posted back to the driving thread.
struct ReadResult {
    group_id: i32,
    key: BundleKey,
    outcome: Result<Arc<dyn BundleData>, BundleLaneError>,
}

/// Owns the FIFO of task groups and the single "current" slot.
///
/// The scheduler's lifecycle is tied to its agent: dropping the agent closes
/// the request channel and joins the worker.
pub(crate) struct LoadScheduler {
    pending: VecDeque<TaskGroup>,
    current: Option<TaskGroup>,
    req_tx: Option<Sender<ReadRequest>>,
    res_rx: Receiver<ReadResult>,
    worker: Option<JoinHandle<()>>,
}

impl LoadScheduler {
    /// Spawns the I/O worker and returns an idle scheduler.
    pub(crate) fn new(lane: Arc<BundleLoadingLane>) -> io::Result<Self> {
        let (req_tx, req_rx) = unbounded::<ReadRequest>();
        let (res_tx, res_rx) = unbounded::<ReadResult>();

        let worker = thread::Builder::new()
            .name("pyxis-bundle-io".to_string())
            .spawn(move || {
                while let Ok(request) = req_rx.recv() {
                    let outcome = lane.load(&request.key);
                    let result = ReadResult {
                        group_id: request.group_id,
                        key: request.key,
                        outcome,
                    };
                    if res_tx.send(result).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            pending: VecDeque::new(),
            current: None,
            req_tx: Some(req_tx),
            res_rx,
            worker: Some(worker),
        })
    }

    /// Appends a group to the FIFO. It starts on the next drive step.
    pub(crate) fn enqueue(&mut self, group: TaskGroup) {
        debug_assert_eq!(group.state, GroupState::Pending);
        self.pending.push_back(group);
    }

    /// The number of groups that are queued or actively advancing.
    pub(crate) fn queued(&self) -> usize {
        let active = matches!(
            &self.current,
            Some(group) if group.state == GroupState::Running
        ) as usize;
        self.pending.len() + active
    }

    /// Cancels one group by id.
    ///
    /// A queued-but-not-started group is evicted silently. The currently
    /// running group has its progression stopped and its callback
    /// suppressed; the queue still advances past it. An unknown id is a
    /// no-op.
    pub(crate) fn cancel(&mut self, id: i32) {
        if let Some(pos) = self.pending.iter().position(|group| group.id == id) {
            self.pending.remove(pos);
            return;
        }

        match self.current.as_mut() {
            Some(group) if group.id == id => {
                group.state = GroupState::Cancelled;
                group.on_complete = None;
                log::debug!("cancelled running load task {id}");
            }
            _ => log::debug!("{}", LoadError::TaskNotFound { id }),
        }
    }

    /// Cancels every queued and running group.
    pub(crate) fn cancel_all(&mut self) {
        self.pending.clear();
        if let Some(group) = self.current.as_mut() {
            group.state = GroupState::Cancelled;
            group.on_complete = None;
        }
    }

    /// The drive step: drains finished reads back into the cache, then keeps
    /// the lane busy with the next group in FIFO order.
    pub(crate) fn update(&mut self, cache: &mut BundleCache) {
        while let Ok(result) = self.res_rx.try_recv() {
            self.on_read_complete(result, cache);
        }
        self.advance_queue(cache);
    }

    fn on_read_complete(&mut self, result: ReadResult, cache: &mut BundleCache) {
        let belongs_to_current = matches!(
            &self.current,
            Some(group) if group.id == result.group_id && group.state == GroupState::Running
        );
        if !belongs_to_current {
            // Stale read for a cancelled or superseded group: drop the data
            // without touching the cache, and fire nothing.
            return;
        }

        match result.outcome {
            Ok(data) => {
                // Counts the use for the task that requested it.
                cache.insert(result.key, data);
                if let Some(group) = self.current.as_mut() {
                    group.tasks.pop_front();
                    group.completed += 1;
                }
                self.advance_current(cache);
            }
            Err(err) => {
                log::error!("load task {} failed: {err}", result.group_id);
                self.finish_current(cache, true);
            }
        }
    }

    /// Starts queued groups while the lane is free. A cancelled current
    /// group frees the lane immediately; its stale read, if any, is
    /// discarded by id when it arrives.
    fn advance_queue(&mut self, cache: &mut BundleCache) {
        loop {
            let lane_free = match &self.current {
                None => true,
                Some(group) => group.state == GroupState::Cancelled,
            };
            if !lane_free {
                return;
            }

            let Some(mut group) = self.pending.pop_front() else {
                return;
            };
            group.state = GroupState::Running;
            self.current = Some(group);
            self.advance_current(cache);
        }
    }

    /// Advances the current group one task at a time: resident bundles
    /// complete through the cache immediately, the first miss suspends the
    /// group on the worker.
    fn advance_current(&mut self, cache: &mut BundleCache) {
        let (group_id, next) = loop {
            let Some(group) = self.current.as_mut() else {
                return;
            };
            if group.state != GroupState::Running {
                return;
            }

            match group.tasks.front() {
                Some(task) => {
                    if cache.checkout(&task.bundle).is_some() {
                        // Resident: the checkout counted this task's use.
                        group.tasks.pop_front();
                        group.completed += 1;
                        continue;
                    }
                    break (group.id, Some((task.bundle.clone(), task.is_main)));
                }
                None => break (group.id, None),
            }
        };

        match next {
            Some((key, is_main)) => {
                if is_main {
                    log::debug!("load task {group_id}: reading main bundle '{key}'");
                } else {
                    log::debug!("load task {group_id}: reading dependency bundle '{key}'");
                }
                let sent = self
                    .req_tx
                    .as_ref()
                    .is_some_and(|tx| tx.send(ReadRequest { group_id, key }).is_ok());
                if !sent {
                    log::error!("bundle I/O worker unavailable; failing load task {group_id}");
                    self.finish_current(cache, true);
                }
            }
            None => self.finish_current(cache, false),
        }
    }

    /// Completes the current group: on success, extracts the typed asset
    /// from the main bundle; either way, fires the callback exactly once
    /// and frees the lane.
    fn finish_current(&mut self, cache: &mut BundleCache, failed: bool) {
        let Some(mut group) = self.current.take() else {
            return;
        };

        let (progress, asset) = if failed {
            (group.progress(), None)
        } else {
            let asset = cache
                .get(&group.record.bundle)
                .and_then(|wrapper| wrapper.extract(&group.record.load_path, group.record.kind));
            if asset.is_none() {
                log::error!(
                    "{}",
                    LoadError::AssetNotFound {
                        name: group.record.load_path.clone(),
                    }
                );
            }
            (1.0, asset)
        };

        group.state = GroupState::Complete;
        if let Some(callback) = group.on_complete.take() {
            callback(progress, asset);
        }
    }
}

impl Drop for LoadScheduler {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's recv loop.
        self.req_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
