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

//! Provides the foundational traits and primitive types for the asset system.
//!
//! This module defines the "common language" for all asset-related operations
//! in the runtime. It contains the core contracts that other crates implement
//! or consume, but it has no knowledge of how bundles are loaded or cached.
//!
//! The key components are:
//! - The [`Asset`] trait: a marker for all types that can be treated as assets.
//! - [`BundleKey`]: the stable, case-insensitive identifier of a loadable bundle.
//! - [`AssetRecord`]: the serializable catalog entry tying a logical asset name
//!   to its owning bundle and that bundle's dependencies.
//! - [`AssetHandle`]: the shared, typed pointer handed back to callers.

mod handle;
mod key;
mod record;

pub use handle::*;
pub use key::*;
pub use record::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: the asset type can be safely shared and sent between
///   threads. This is essential for background loading.
/// - `'static`: the asset type does not contain any non-static references,
///   ensuring it can be stored for the lifetime of the application.
pub trait Asset: Send + Sync + 'static {}
