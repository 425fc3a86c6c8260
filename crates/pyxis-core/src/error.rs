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

//! Defines the failure taxonomy for the bundle runtime.
//!
//! None of these are fatal: every variant is resolved at the lowest layer
//! that can produce a meaningful fallback, and the facade translates all of
//! them into a uniform `None` / `-1` contract for external callers. There is
//! no exception-style control flow anywhere in the runtime.

use crate::asset::BundleKey;
use std::fmt;

/// A failure while resolving, loading, or cancelling an asset request.
#[derive(Debug)]
pub enum LoadError {
    /// The catalog has no record for the requested logical name.
    /// Logged and surfaced as an empty result; never a panic condition.
    AssetNotFound {
        /// The normalized name that missed the catalog.
        name: String,
    },
    /// The storage read produced nothing at either search root.
    /// The requesting call fails gracefully; there is no retry.
    BundleLoadFailure {
        /// The bundle that could not be loaded.
        bundle: BundleKey,
        /// The underlying lane or storage error, flattened to text.
        details: String,
    },
    /// A cancellation named a task id that is neither queued nor running.
    /// Callers treat this as a silent no-op.
    TaskNotFound {
        /// The unknown task id.
        id: i32,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::AssetNotFound { name } => {
                write!(f, "Asset not found in catalog: '{name}'")
            }
            LoadError::BundleLoadFailure { bundle, details } => {
                write!(f, "Failed to load bundle '{bundle}': {details}")
            }
            LoadError::TaskNotFound { id } => {
                write!(f, "No load task with id {id}")
            }
        }
    }
}

impl std::error::Error for LoadError {}
