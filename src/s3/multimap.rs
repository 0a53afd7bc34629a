// Ostor Rust Library for Amazon S3 Compatible Object Storage
// Copyright 2024 Ostor Developers.
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

//! Multimap of HTTP headers and query parameters, with the canonical forms
//! required by AWS Signature V4.

use crate::s3::utils::url_encode;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Multimap for string key and string value
pub type Multimap = multimap::MultiMap<String, String>;

/// Collapses runs of spaces into a single space, as required by the
/// canonical-header form. Returns `Cow::Borrowed` when no rewrite is needed.
fn collapse_spaces(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    if !trimmed.contains("  ") {
        return Cow::Borrowed(trimmed);
    }
    let mut result = String::with_capacity(trimmed.len());
    let mut prev_space = false;
    for c in trimmed.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }
    Cow::Owned(result)
}

pub trait MultimapExt {
    /// Adds a key-value pair to the multimap
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Adds all entries of `other` to this multimap
    fn add_multimap(&mut self, other: Multimap);

    /// Adds a `versionId` query parameter when a version is given
    fn add_version(&mut self, version: Option<String>);

    /// Converts multimap to HTTP query string
    fn to_query_string(&self) -> String;

    /// Converts multimap to canonical query string
    fn get_canonical_query_string(&self) -> String;

    /// Converts multimap to signed headers and canonical headers
    fn get_canonical_headers(&self) -> (String, String);
}

impl MultimapExt for Multimap {
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.insert(key.into(), value.into());
    }

    fn add_multimap(&mut self, other: Multimap) {
        for (key, values) in other.into_iter() {
            self.insert_many(key, values);
        }
    }

    fn add_version(&mut self, version: Option<String>) {
        if let Some(v) = version {
            self.insert("versionId".into(), v);
        }
    }

    fn to_query_string(&self) -> String {
        let mut query = String::new();
        for (key, values) in self.iter_all() {
            for value in values {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&url_encode(key));
                query.push('=');
                query.push_str(&url_encode(value));
            }
        }
        query
    }

    fn get_canonical_query_string(&self) -> String {
        // BTreeMap gives the lexical key ordering the canonical form wants.
        let mut sorted: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, values) in self.iter_all() {
            sorted
                .entry(key.as_str())
                .or_default()
                .extend(values.iter().map(|s| s.as_str()));
        }

        let mut query = String::new();
        for (key, mut values) in sorted {
            values.sort_unstable();
            for value in values {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&url_encode(key));
                query.push('=');
                query.push_str(&url_encode(value));
            }
        }
        query
    }

    fn get_canonical_headers(&self) -> (String, String) {
        let mut btmap: BTreeMap<String, String> = BTreeMap::new();

        for (k, values) in self.iter_all() {
            let key = k.to_lowercase();
            if key == "authorization" || key == "user-agent" {
                continue;
            }

            let mut vs: Vec<&String> = values.iter().collect();
            vs.sort_unstable();

            let mut value = String::new();
            for v in vs {
                if !value.is_empty() {
                    value.push(',');
                }
                value.push_str(&collapse_spaces(v));
            }
            btmap.insert(key, value);
        }

        let mut signed_headers = String::new();
        let mut canonical_headers = String::new();
        let mut add_delim = false;
        for (key, value) in &btmap {
            if add_delim {
                signed_headers.push(';');
                canonical_headers.push('\n');
            }

            signed_headers.push_str(key);

            canonical_headers.push_str(key);
            canonical_headers.push(':');
            canonical_headers.push_str(value);

            add_delim = true;
        }

        (signed_headers, canonical_headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_spaces_untouched() {
        let result = collapse_spaces("hello world");
        assert_eq!(result, "hello world");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn collapse_spaces_runs() {
        assert_eq!(collapse_spaces("a  b   c"), "a b c");
        assert_eq!(collapse_spaces("  padded  value  "), "padded value");
        assert_eq!(collapse_spaces("   "), "");
    }

    #[test]
    fn canonical_headers_sorted_and_lowercased() {
        let mut map = Multimap::new();
        map.add("Host", "example.com");
        map.add("X-Amz-Date", "20130524T000000Z");
        map.add("Content-Type", "text/plain");
        map.add("User-Agent", "skipped");
        map.add("Authorization", "skipped");

        let (signed, canonical) = map.get_canonical_headers();
        assert_eq!(signed, "content-type;host;x-amz-date");
        assert_eq!(
            canonical,
            "content-type:text/plain\nhost:example.com\nx-amz-date:20130524T000000Z"
        );
    }

    #[test]
    fn canonical_headers_multiple_values_collapsed() {
        let mut map = Multimap::new();
        map.add("X-Amz-Meta-Tag", "beta");
        map.add("X-Amz-Meta-Tag", "alpha");

        let (_, canonical) = map.get_canonical_headers();
        assert_eq!(canonical, "x-amz-meta-tag:alpha,beta");
    }

    #[test]
    fn canonical_query_string_sorted_and_encoded() {
        let mut map = Multimap::new();
        map.add("uploads", "");
        map.add("prefix", "a b");
        map.add("delimiter", "/");

        assert_eq!(
            map.get_canonical_query_string(),
            "delimiter=%2F&prefix=a%20b&uploads="
        );
    }
}
