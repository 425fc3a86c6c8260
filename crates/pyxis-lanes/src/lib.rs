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

//! # Pyxis Lanes
//!
//! Hot-path execution pipeline for bundle I/O: the [`bundle_lane`] turns a
//! bundle key into a loaded bundle object by addressing it across the
//! primary and secondary art roots and reading it through the host's
//! storage collaborator.

#![warn(missing_docs)]

pub mod bundle_lane;

pub use bundle_lane::{BundleLaneError, BundleLoadingLane};
