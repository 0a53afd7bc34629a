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
use crate::s3::header_constants::CONTENT_LENGTH;
use crate::s3::object_content::ObjectContent;
use crate::s3::types::{FromS3Response, S3Request};
use crate::s3::utils::trim_quotes;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use http::HeaderMap;
use std::mem;
use std::path::PathBuf;

/// Response of the GetObject S3 API. The body is consumed from the
/// response; dropping this value releases the connection.
#[derive(Debug)]
pub struct GetObjectResponse {
    pub headers: HeaderMap,
    pub region: String,
    pub bucket: String,
    pub object: String,
    pub etag: String,
    pub version_id: Option<String>,
    /// Size of the returned content (the range length for ranged reads).
    pub object_size: u64,

    resp: reqwest::Response,
}

#[async_trait]
impl FromS3Response for GetObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());

        let etag = headers
            .get("etag")
            .map(|v| v.to_str())
            .transpose()?
            .map(trim_quotes)
            .unwrap_or_default()
            .to_string();

        let version_id = headers
            .get("x-amz-version-id")
            .map(|v| v.to_str())
            .transpose()?
            .map(String::from);

        let object_size = match headers.get(CONTENT_LENGTH) {
            Some(v) => v.to_str()?.parse::<u64>()?,
            None => 0,
        };

        Ok(Self {
            headers,
            region: req.inner_region.clone(),
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            etag,
            version_id,
            object_size,
            resp,
        })
    }
}

impl GetObjectResponse {
    /// The object body as a raw byte stream.
    pub fn into_byte_stream(
        self,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Unpin {
        Box::pin(self.resp.bytes_stream().map_err(std::io::Error::other))
    }

    /// The object body as [`ObjectContent`].
    pub fn into_content(self) -> ObjectContent {
        let size = self.object_size;
        ObjectContent::new_from_stream(self.into_byte_stream(), size)
    }

    /// Reads the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        Ok(self.resp.bytes().await?)
    }
}

/// Response of a resumable file download.
#[derive(Clone, Debug)]
pub struct DownloadObjectResponse {
    pub bucket: String,
    pub object: String,
    pub etag: String,
    pub object_size: u64,
    pub filename: PathBuf,
    /// True when the destination already held the complete object and no
    /// transfer was performed.
    pub skipped: bool,
}
