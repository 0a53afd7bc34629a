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

use crate::s3::segmented_bytes::SegmentedBytes;
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncReadExt;

type IoResult<T> = std::result::Result<T, std::io::Error>;

// region: Size

/// Payload size of an upload: known up front or discovered while streaming.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum Size {
    Known(u64),
    #[default]
    Unknown,
}

impl Size {
    pub fn is_known(&self) -> bool {
        matches!(self, Size::Known(_))
    }

    pub fn value(&self) -> Option<u64> {
        match self {
            Size::Known(v) => Some(*v),
            Size::Unknown => None,
        }
    }
}

impl From<Option<u64>> for Size {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(v) => Size::Known(v),
            None => Size::Unknown,
        }
    }
}

impl From<u64> for Size {
    fn from(value: u64) -> Self {
        Size::Known(value)
    }
}

// endregion: Size

/// Object content that can be uploaded or downloaded.
///
/// Can be constructed from in-memory bytes, a file path, or a stream of
/// `Bytes` with a known or unknown total size.
pub struct ObjectContent(ObjectContentInner);

enum ObjectContentInner {
    Stream(Pin<Box<dyn Stream<Item = IoResult<Bytes>> + Send>>, Size),
    FilePath(PathBuf),
    Bytes(SegmentedBytes),
}

impl From<Bytes> for ObjectContent {
    fn from(value: Bytes) -> Self {
        ObjectContent(ObjectContentInner::Bytes(SegmentedBytes::from(value)))
    }
}

impl From<String> for ObjectContent {
    fn from(value: String) -> Self {
        ObjectContent(ObjectContentInner::Bytes(SegmentedBytes::from(value)))
    }
}

impl From<Vec<u8>> for ObjectContent {
    fn from(value: Vec<u8>) -> Self {
        ObjectContent(ObjectContentInner::Bytes(SegmentedBytes::from(value)))
    }
}

impl From<&'static [u8]> for ObjectContent {
    fn from(value: &'static [u8]) -> Self {
        ObjectContent(ObjectContentInner::Bytes(SegmentedBytes::from(
            Bytes::from_static(value),
        )))
    }
}

impl From<&'static str> for ObjectContent {
    fn from(value: &'static str) -> Self {
        ObjectContent::from(value.as_bytes() as &'static [u8])
    }
}

impl From<&Path> for ObjectContent {
    fn from(value: &Path) -> Self {
        ObjectContent(ObjectContentInner::FilePath(value.to_path_buf()))
    }
}

impl From<SegmentedBytes> for ObjectContent {
    fn from(value: SegmentedBytes) -> Self {
        ObjectContent(ObjectContentInner::Bytes(value))
    }
}

impl Default for ObjectContent {
    fn default() -> Self {
        ObjectContent(ObjectContentInner::Bytes(SegmentedBytes::new()))
    }
}

impl ObjectContent {
    /// Creates object content from a stream of `Bytes` and an optionally
    /// known total size.
    pub fn new_from_stream(
        r: impl Stream<Item = IoResult<Bytes>> + Send + 'static,
        size: impl Into<Size>,
    ) -> Self {
        ObjectContent(ObjectContentInner::Stream(Box::pin(r), size.into()))
    }

    pub async fn to_stream(
        self,
    ) -> IoResult<(Pin<Box<dyn Stream<Item = IoResult<Bytes>> + Send>>, Size)> {
        match self.0 {
            ObjectContentInner::Stream(r, size) => Ok((r, size)),

            ObjectContentInner::FilePath(path) => {
                let mut file = tokio::fs::File::open(&path).await?;
                let size = file.metadata().await?.len();

                let stream = async_stream::try_stream! {
                    let mut buf = vec![0u8; 64 * 1024];
                    loop {
                        let n = file.read(&mut buf).await?;
                        if n == 0 {
                            break;
                        }
                        yield Bytes::copy_from_slice(&buf[..n]);
                    }
                };

                Ok((Box::pin(stream), Size::Known(size)))
            }

            ObjectContentInner::Bytes(sb) => {
                let size = sb.len() as u64;
                let r = Box::pin(stream::iter(sb.into_iter().map(Ok)));
                Ok((r, Size::Known(size)))
            }
        }
    }

    pub(crate) async fn into_content_stream(self) -> IoResult<ContentStream> {
        let (r, size) = self.to_stream().await?;
        Ok(ContentStream::new(r, size))
    }

    /// Loads the whole content into memory.
    pub async fn to_segmented_bytes(self) -> IoResult<SegmentedBytes> {
        let mut segmented_bytes = SegmentedBytes::new();
        let (mut r, _) = self.to_stream().await?;
        while let Some(bytes) = r.next().await {
            segmented_bytes.append(bytes?);
        }
        Ok(segmented_bytes)
    }
}

/// A pull-based reader over object content, with support for reading exact
/// amounts and pushing unconsumed bytes back.
pub struct ContentStream {
    r: Pin<Box<dyn Stream<Item = IoResult<Bytes>> + Send>>,
    extra: Option<Bytes>,
    size: Size,
}

impl ContentStream {
    pub fn new(
        r: impl Stream<Item = IoResult<Bytes>> + Send + 'static,
        size: impl Into<Size>,
    ) -> Self {
        Self {
            r: Box::pin(r),
            extra: None,
            size: size.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            r: Box::pin(stream::iter(vec![])),
            extra: None,
            size: Size::Known(0),
        }
    }

    pub fn get_size(&self) -> Size {
        self.size
    }

    /// Pushes unconsumed bytes back; the next `read_upto` returns them
    /// first.
    pub fn unread(&mut self, bytes: SegmentedBytes) {
        if bytes.is_empty() {
            return;
        }
        let mut merged = bytes.to_bytes();
        if let Some(extra) = self.extra.take() {
            let mut buf = Vec::with_capacity(merged.len() + extra.len());
            buf.extend_from_slice(&merged);
            buf.extend_from_slice(&extra);
            merged = Bytes::from(buf);
        }
        self.extra = Some(merged);
    }

    /// Turns the reader back into a plain stream, replaying any pushed-back
    /// bytes first.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = IoResult<Bytes>> + Send>> {
        match self.extra {
            Some(extra) => Box::pin(stream::iter(vec![Ok(extra)]).chain(self.r)),
            None => self.r,
        }
    }

    /// Reads as many bytes as available up to `n`. A short result means the
    /// stream is exhausted.
    pub async fn read_upto(&mut self, n: usize) -> IoResult<SegmentedBytes> {
        let mut segmented_bytes = SegmentedBytes::new();
        let mut remaining = n;

        if let Some(extra) = self.extra.take() {
            let len = extra.len();
            if len <= remaining {
                segmented_bytes.append(extra);
                remaining -= len;
            } else {
                segmented_bytes.append(extra.slice(0..remaining));
                self.extra = Some(extra.slice(remaining..));
                return Ok(segmented_bytes);
            }
        }

        while remaining > 0 {
            let Some(bytes) = self.r.next().await else {
                break;
            };
            let bytes = bytes?;
            let len = bytes.len();
            if len == 0 {
                continue;
            }
            if len <= remaining {
                segmented_bytes.append(bytes);
                remaining -= len;
            } else {
                segmented_bytes.append(bytes.slice(0..remaining));
                self.extra = Some(bytes.slice(remaining..));
                break;
            }
        }

        Ok(segmented_bytes)
    }
}

impl From<SegmentedBytes> for ContentStream {
    fn from(sb: SegmentedBytes) -> Self {
        let size = sb.len() as u64;
        ContentStream::new(stream::iter(sb.into_iter().map(Ok)), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_upto_respects_boundaries() {
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"hello")),
            Ok(Bytes::from_static(b"world")),
        ];
        let mut cs = ContentStream::new(stream::iter(chunks), 10_u64);

        let first = cs.read_upto(7).await.unwrap();
        assert_eq!(first.to_bytes().as_ref(), b"hellowo");

        let rest = cs.read_upto(100).await.unwrap();
        assert_eq!(rest.to_bytes().as_ref(), b"rld");

        let eof = cs.read_upto(1).await.unwrap();
        assert!(eof.is_empty());
    }

    #[tokio::test]
    async fn unread_bytes_come_back_first() {
        let chunks = vec![Ok::<_, std::io::Error>(Bytes::from_static(b"abcdef"))];
        let mut cs = ContentStream::new(stream::iter(chunks), 6_u64);

        let mut head = cs.read_upto(4).await.unwrap();
        let tail = head.split_off(2);
        cs.unread(tail);

        let next = cs.read_upto(10).await.unwrap();
        assert_eq!(next.to_bytes().as_ref(), b"cdef");
    }
}
