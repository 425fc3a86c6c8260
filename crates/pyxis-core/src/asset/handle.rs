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

use super::Asset;
use std::{ops::Deref, sync::Arc};

/// A thread-safe, reference-counted handle to an extracted asset.
///
/// This acts as a smart pointer, providing shared ownership of an asset's
/// data. Cloning a handle is cheap, as it only increments the reference count
/// and does not duplicate the underlying asset data.
///
/// Note that this count is independent of the bundle cache's use-count: the
/// cache tracks how many acquisitions a *bundle* has outstanding, while this
/// handle tracks consumers of one extracted asset. The asset data is
/// deallocated when the last handle is dropped.
#[derive(Debug)]
pub struct AssetHandle<T: Asset>(Arc<T>);

impl<T: Asset> AssetHandle<T> {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Wraps an already shared asset, typically the result of downcasting a
    /// type-erased value produced by the bundle extraction bridge.
    pub fn from_arc(asset: Arc<T>) -> Self {
        Self(asset)
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Asset> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blob {
        bytes: Vec<u8>,
    }
    impl Asset for Blob {}

    #[test]
    fn test_clone_shares_data() {
        let a = AssetHandle::new(Blob {
            bytes: vec![1, 2, 3],
        });
        let b = a.clone();
        assert_eq!(a.bytes, b.bytes);
        assert!(std::ptr::eq(&*a, &*b));
    }

    #[test]
    fn test_from_arc_does_not_copy() {
        let shared = Arc::new(Blob { bytes: vec![7] });
        let handle = AssetHandle::from_arc(shared.clone());
        assert!(std::ptr::eq(&*handle, &*shared));
    }
}
