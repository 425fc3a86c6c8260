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

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stable identifier of one loadable bundle file.
///
/// A `BundleKey` is an opaque, case-insensitive string key: it is normalized
/// to lowercase at construction and on deserialization, so two keys that
/// differ only in case compare and hash as equal. In hash-name indexing mode
/// the key is a content hash; otherwise it is a path-derived name. Either
/// way the cache and the catalog treat it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct BundleKey(String);

impl BundleKey {
    /// Creates a key from a raw identifier, normalizing its case.
    pub fn new(raw: &str) -> Self {
        Self(raw.to_ascii_lowercase())
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BundleKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for BundleKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_keys_are_case_insensitive() {
        assert_eq!(BundleKey::new("Art/Hero.Bundle"), BundleKey::new("art/hero.bundle"));
    }

    #[test]
    fn test_map_lookup_ignores_case() {
        let mut map = HashMap::new();
        map.insert(BundleKey::new("SHARED/ATLAS"), 1);
        assert_eq!(map.get(&BundleKey::new("shared/atlas")), Some(&1));
    }
}
