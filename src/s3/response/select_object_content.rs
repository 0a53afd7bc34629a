// Ostor Rust Library for Amazon S3 Compatible Object Storage
// Copyright 2025 Ostor Developers.
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

//! Response of the SelectObjectContent S3 API: a framed stream of typed
//! messages. Record payloads surface through [`SelectObjectContentResponse::read`];
//! progress and stats update the `progress` field as frames arrive.
//!
//! Frame layout: an 8-byte prelude (total length, header length), a CRC32
//! of the prelude, typed headers, the payload, and a CRC32 of the whole
//! message.

use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::types::{FromS3Response, S3Request, SelectProgress};
use crate::s3::utils::{copy_slice, crc32, uint32};
use async_trait::async_trait;
use http::HeaderMap;
use std::collections::VecDeque;
use std::io::BufReader;
use std::mem;
use xmltree::Element;

/// Response of the SelectObjectContent S3 API. The caller must consume or
/// drop the stream; the underlying connection is held until then.
#[derive(Debug)]
pub struct SelectObjectContentResponse {
    pub headers: HeaderMap,
    pub region: String,
    pub bucket: String,
    pub object: String,
    pub progress: SelectProgress,

    resp: reqwest::Response,

    done: bool,
    buf: VecDeque<u8>,

    prelude: [u8; 8],
    prelude_read: bool,

    prelude_crc: [u8; 4],
    prelude_crc_read: bool,

    total_length: usize,

    data: Vec<u8>,
    data_read: bool,

    message_crc: [u8; 4],
    message_crc_read: bool,

    payload: Vec<u8>,
    payload_index: usize,
}

#[async_trait]
impl FromS3Response for SelectObjectContentResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;

        Ok(Self {
            headers: mem::take(resp.headers_mut()),
            region: req.inner_region.clone(),
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            progress: SelectProgress::default(),
            resp,
            done: false,
            buf: VecDeque::new(),
            prelude: [0_u8; 8],
            prelude_read: false,
            prelude_crc: [0_u8; 4],
            prelude_crc_read: false,
            total_length: 0,
            data: Vec::new(),
            data_read: false,
            message_crc: [0_u8; 4],
            message_crc_read: false,
            payload: Vec::new(),
            payload_index: 0,
        })
    }
}

impl SelectObjectContentResponse {
    fn reset(&mut self) {
        self.data.clear();
        self.data_read = false;

        self.prelude_read = false;
        self.prelude_crc_read = false;
        self.message_crc_read = false;
    }

    fn take_buffered(&mut self, dest: &mut [u8]) -> bool {
        if self.buf.len() < dest.len() {
            return false;
        }
        for slot in dest.iter_mut() {
            *slot = self.buf.pop_front().expect("length checked above");
        }
        true
    }

    fn read_prelude(&mut self) -> bool {
        let mut prelude = [0_u8; 8];
        if !self.take_buffered(&mut prelude) {
            return false;
        }
        self.prelude = prelude;
        self.prelude_read = true;
        true
    }

    fn read_prelude_crc(&mut self) -> bool {
        let mut crc = [0_u8; 4];
        if !self.take_buffered(&mut crc) {
            return false;
        }
        self.prelude_crc = crc;
        self.prelude_crc_read = true;
        true
    }

    fn read_data(&mut self) -> bool {
        let data_length = self.total_length - 8 - 4 - 4;
        if self.buf.len() < data_length {
            return false;
        }

        self.data = Vec::with_capacity(data_length);
        for _ in 0..data_length {
            self.data.push(self.buf.pop_front().expect("length checked"));
        }
        self.data_read = true;
        true
    }

    fn read_message_crc(&mut self) -> bool {
        let mut crc = [0_u8; 4];
        if !self.take_buffered(&mut crc) {
            return false;
        }
        self.message_crc = crc;
        self.message_crc_read = true;
        true
    }

    fn decode_headers(&self, header_length: usize) -> Result<Multimap, Error> {
        let mut headers = Multimap::new();
        let mut offset = 0_usize;
        while offset < header_length {
            let mut length = self.data[offset] as usize;
            offset += 1;
            if length == 0 {
                break;
            }

            let name = std::str::from_utf8(&self.data[offset..offset + length])?;
            offset += length;

            // Only value type 7 (string) occurs in select event streams.
            if self.data[offset] != 7 {
                return Err(Error::protocol(format!(
                    "invalid header value type {}",
                    self.data[offset]
                )));
            }
            offset += 1;

            let b0 = self.data[offset] as u16;
            offset += 1;
            let b1 = self.data[offset] as u16;
            offset += 1;
            length = ((b0 << 8) | b1) as usize;

            let value = std::str::from_utf8(&self.data[offset..offset + length])?;
            offset += length;

            headers.add(name, value);
        }

        Ok(headers)
    }

    async fn do_read(&mut self) -> Result<(), Error> {
        if self.done {
            return Ok(());
        }

        loop {
            let chunk = match self.resp.chunk().await? {
                Some(v) => v,
                None => return Ok(()),
            };

            self.buf.extend(chunk.iter().copied());

            if !self.prelude_read && !self.read_prelude() {
                continue;
            }

            if !self.prelude_crc_read {
                if !self.read_prelude_crc() {
                    continue;
                }

                let got = crc32(&self.prelude);
                let expected = uint32(&self.prelude_crc)?;
                if got != expected {
                    self.done = true;
                    return Err(Error::protocol(format!(
                        "prelude CRC mismatch; expected: {expected}, got: {got}"
                    )));
                }

                self.total_length = uint32(&self.prelude[0..4])? as usize;
            }

            if !self.data_read && !self.read_data() {
                continue;
            }

            if !self.message_crc_read {
                if !self.read_message_crc() {
                    continue;
                }

                let mut message: Vec<u8> = Vec::new();
                message.extend_from_slice(&self.prelude);
                message.extend_from_slice(&self.prelude_crc);
                message.extend_from_slice(&self.data);

                let got = crc32(&message);
                let expected = uint32(&self.message_crc)?;
                if got != expected {
                    self.done = true;
                    return Err(Error::protocol(format!(
                        "message CRC mismatch; expected: {expected}, got: {got}"
                    )));
                }
            }

            let header_length = uint32(&self.prelude[4..])? as usize;
            let headers = self.decode_headers(header_length)?;

            if headers.get(":message-type").map(String::as_str) == Some("error") {
                self.done = true;
                return Err(Error::protocol(format!(
                    "select failed; error code: {}, message: {}",
                    headers.get(":error-code").cloned().unwrap_or_default(),
                    headers.get(":error-message").cloned().unwrap_or_default(),
                )));
            }

            let event_type = headers
                .get(":event-type")
                .cloned()
                .unwrap_or_default();

            if event_type == "End" {
                self.done = true;
                return Ok(());
            }

            let payload_length = self.total_length - header_length - 16;
            if event_type == "Cont" || payload_length < 1 {
                self.reset();
                continue;
            }

            let payload = &self.data[header_length..(header_length + payload_length)];
            if event_type == "Progress" || event_type == "Stats" {
                let root = Element::parse(&mut BufReader::new(payload))?;
                self.progress = SelectProgress {
                    bytes_scanned: crate::s3::utils::get_text(&root, "BytesScanned")?
                        .parse::<usize>()?,
                    bytes_progressed: crate::s3::utils::get_text(&root, "BytesProcessed")?
                        .parse::<usize>()?,
                    bytes_returned: crate::s3::utils::get_text(&root, "BytesReturned")?
                        .parse::<usize>()?,
                };
                self.reset();
                continue;
            }

            if event_type == "Records" {
                self.payload = payload.to_vec();
                self.payload_index = 0;
                self.reset();
                return Ok(());
            }

            self.done = true;
            return Err(Error::protocol(format!("unknown event type {event_type}")));
        }
    }

    /// Reads record bytes into `buf`; returns 0 at end of stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            if self.done {
                return Ok(0);
            }

            let payload_len = self.payload.len();
            if self.payload_index < payload_len {
                let n = copy_slice(buf, &self.payload[self.payload_index..]);
                self.payload_index = (self.payload_index + n).min(payload_len);
                return Ok(n);
            }

            self.payload.clear();
            self.payload_index = 0;

            match self.do_read().await {
                Err(e) => {
                    self.done = true;
                    return Err(std::io::Error::other(e.to_string()));
                }
                Ok(()) => {
                    if self.payload.is_empty() {
                        self.done = true;
                        return Ok(0);
                    }
                }
            }
        }
    }
}
