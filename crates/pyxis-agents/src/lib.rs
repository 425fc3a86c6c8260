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

//! # Pyxis Agents
//!
//! High-level wrappers that drive the loading lanes. The [`bundle_agent`]
//! is the public entry point of the bundle runtime: it owns the catalog,
//! the cache, and the serialized load scheduler, and exposes the
//! synchronous and asynchronous asset retrieval API.

#![warn(missing_docs)]

pub mod bundle_agent;

pub use bundle_agent::BundleAgent;
