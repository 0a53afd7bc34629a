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

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, NotificationRecords, S3Request};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use http::HeaderMap;
use std::mem;

/// Response of the bucket notification listen API
#[derive(Clone, Debug)]
pub struct ListenBucketNotificationResponse {
    pub headers: HeaderMap,
    pub region: String,
    pub bucket: String,
}

#[async_trait]
impl FromS3Response
    for (
        ListenBucketNotificationResponse,
        Box<dyn Stream<Item = Result<NotificationRecords, Error>> + Unpin + Send>,
    )
{
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());

        // The long-poll body is newline-delimited JSON; empty lines are
        // keep-alive heartbeats.
        let line_stream = async_stream::try_stream! {
            let mut byte_stream = resp.bytes_stream();
            let mut buf: Vec<u8> = Vec::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(Error::from)?;
                buf.extend_from_slice(&chunk);

                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = std::str::from_utf8(&line[..line.len() - 1])
                        .map_err(Error::from)?
                        .trim();
                    if !line.is_empty() {
                        let records: NotificationRecords =
                            serde_json::from_str(line).map_err(Error::from)?;
                        yield records;
                    }
                }
            }

            // Flush a final unterminated line, if any.
            if !buf.is_empty() {
                let line = std::str::from_utf8(&buf).map_err(Error::from)?.trim();
                if !line.is_empty() {
                    let records: NotificationRecords =
                        serde_json::from_str(line).map_err(Error::from)?;
                    yield records;
                }
            }
        };

        Ok((
            ListenBucketNotificationResponse {
                headers,
                region: req.inner_region.clone(),
                bucket: req.bucket.clone().unwrap_or_default(),
            },
            Box::new(Box::pin(line_stream)),
        ))
    }
}
