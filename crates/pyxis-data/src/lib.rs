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

//! # Pyxis Data
//!
//! In-memory data services for the bundle runtime: the immutable
//! [`catalog::BundleCatalog`] mapping logical asset names to bundles and
//! dependency lists, and the reference-counted [`cache::BundleCache`] that
//! owns every resident bundle.

#![warn(missing_docs)]

pub mod cache;
pub mod catalog;

pub use cache::{BundleCache, BundleWrapper};
pub use catalog::{BundleCatalog, CatalogIndex};
