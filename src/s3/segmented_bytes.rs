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

use bytes::{Bytes, BytesMut};

/// An aggregated collection of `Bytes` segments, used to buffer request and
/// part payloads without copying them into one contiguous allocation.
#[derive(Debug, Clone, Default)]
pub struct SegmentedBytes {
    segments: Vec<Bytes>,
    total_size: usize,
}

impl SegmentedBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.total_size
    }

    pub fn is_empty(&self) -> bool {
        self.total_size == 0
    }

    pub fn append(&mut self, bytes: Bytes) {
        if bytes.is_empty() {
            return;
        }
        self.total_size += bytes.len();
        self.segments.push(bytes);
    }

    /// Iterates the segments; cloning `Bytes` is a cheap refcount bump.
    pub fn iter(&self) -> impl Iterator<Item = Bytes> + '_ {
        self.segments.iter().cloned()
    }

    /// Splits off everything after the first `at` bytes, leaving this
    /// value holding exactly `min(at, len)` bytes.
    pub fn split_off(&mut self, at: usize) -> SegmentedBytes {
        if at >= self.total_size {
            return SegmentedBytes::new();
        }

        let mut head: Vec<Bytes> = Vec::new();
        let mut tail: Vec<Bytes> = Vec::new();
        let mut taken = 0_usize;
        for segment in self.segments.drain(..) {
            if taken >= at {
                tail.push(segment);
                continue;
            }
            let remaining = at - taken;
            if segment.len() <= remaining {
                taken += segment.len();
                head.push(segment);
            } else {
                taken = at;
                head.push(segment.slice(0..remaining));
                tail.push(segment.slice(remaining..));
            }
        }

        let tail_size = self.total_size - at;
        self.segments = head;
        self.total_size = at;

        SegmentedBytes {
            segments: tail,
            total_size: tail_size,
        }
    }

    /// Copies all content into a single `Bytes`. Intended for bodies that
    /// are small by construction (control-plane XML, chunk hashing).
    pub fn to_bytes(&self) -> Bytes {
        if self.segments.len() == 1 {
            return self.segments[0].clone();
        }
        let mut buf = BytesMut::with_capacity(self.total_size);
        for bytes in &self.segments {
            buf.extend_from_slice(bytes);
        }
        buf.freeze()
    }
}

impl IntoIterator for SegmentedBytes {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl From<Bytes> for SegmentedBytes {
    fn from(bytes: Bytes) -> Self {
        let total_size = bytes.len();
        Self {
            segments: vec![bytes],
            total_size,
        }
    }
}

impl From<String> for SegmentedBytes {
    fn from(s: String) -> Self {
        SegmentedBytes::from(Bytes::from(s.into_bytes()))
    }
}

impl From<Vec<u8>> for SegmentedBytes {
    fn from(v: Vec<u8>) -> Self {
        SegmentedBytes::from(Bytes::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sb(parts: &[&'static [u8]]) -> SegmentedBytes {
        let mut v = SegmentedBytes::new();
        for p in parts {
            v.append(Bytes::from_static(p));
        }
        v
    }

    #[test]
    fn split_off_within_a_segment() {
        let mut v = sb(&[b"hello", b"world"]);
        let tail = v.split_off(7);
        assert_eq!(v.to_bytes().as_ref(), b"hellowo");
        assert_eq!(tail.to_bytes().as_ref(), b"rld");
        assert_eq!(v.len(), 7);
        assert_eq!(tail.len(), 3);
    }

    #[test]
    fn split_off_past_end_is_empty() {
        let mut v = sb(&[b"abc"]);
        let tail = v.split_off(10);
        assert!(tail.is_empty());
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn empty_segments_are_dropped() {
        let mut v = SegmentedBytes::new();
        v.append(Bytes::new());
        v.append(Bytes::from_static(b"x"));
        assert_eq!(v.len(), 1);
        assert_eq!(v.iter().count(), 1);
    }
}
