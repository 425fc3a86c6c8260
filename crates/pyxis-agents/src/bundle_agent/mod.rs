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

//! The agent for the bundle subsystem.
//!
//! This module provides the high-level, tactical logic for asset retrieval.
//! It is the public-facing API for requesting assets and querying their
//! state, but it delegates the heavy lifting: name resolution to the
//! catalog, residency and use-counts to the cache, and storage reads to the
//! loading lane.
//!
//! Asynchronous requests are serialized by the agent's [`scheduler`]: one
//! global FIFO of task groups, at most one advancing at a time, so
//! concurrent requests never race each other into redundant loads of shared
//! dependency bundles. The host loop drives the scheduler by calling
//! [`agent::BundleAgent::update`] once per frame.

pub mod agent;
pub(crate) mod scheduler;

pub use agent::{BundleAgent, LoadCallback};
