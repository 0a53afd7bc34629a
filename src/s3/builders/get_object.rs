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

//! Argument builders for object reads: ranged/conditional GET and the
//! resumable file download built on top of it.

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{DownloadObjectResponse, GetObjectResponse, StatObjectResponse};
use crate::s3::sse::SseCustomerKey;
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::{UtcTime, check_bucket_name, check_object_name, merge};
use futures_util::StreamExt;
use http::Method;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::stat_object::object_conditional_headers;

/// Argument builder for the GetObject S3 API
pub struct GetObject {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    version_id: Option<String>,
    ssec: Option<SseCustomerKey>,
    offset: Option<u64>,
    length: Option<u64>,
    match_etag: Option<String>,
    not_match_etag: Option<String>,
    modified_since: Option<UtcTime>,
    unmodified_since: Option<UtcTime>,
}

impl GetObject {
    pub fn new(client: Client, bucket: &str, object: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: None,
            ssec: None,
            offset: None,
            length: None,
            match_etag: None,
            not_match_etag: None,
            modified_since: None,
            unmodified_since: None,
        }
    }

    pub fn extra_headers(mut self, extra_headers: Option<Multimap>) -> Self {
        self.extra_headers = extra_headers;
        self
    }

    pub fn extra_query_params(mut self, extra_query_params: Option<Multimap>) -> Self {
        self.extra_query_params = extra_query_params;
        self
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn version_id(mut self, version_id: Option<String>) -> Self {
        self.version_id = version_id;
        self
    }

    pub fn ssec(mut self, ssec: Option<SseCustomerKey>) -> Self {
        self.ssec = ssec;
        self
    }

    /// Read starting at this byte offset.
    pub fn offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self
    }

    /// Read at most this many bytes.
    pub fn length(mut self, length: Option<u64>) -> Self {
        self.length = length;
        self
    }

    pub fn match_etag(mut self, match_etag: Option<String>) -> Self {
        self.match_etag = match_etag;
        self
    }

    pub fn not_match_etag(mut self, not_match_etag: Option<String>) -> Self {
        self.not_match_etag = not_match_etag;
        self
    }

    pub fn modified_since(mut self, modified_since: Option<UtcTime>) -> Self {
        self.modified_since = modified_since;
        self
    }

    pub fn unmodified_since(mut self, unmodified_since: Option<UtcTime>) -> Self {
        self.unmodified_since = unmodified_since;
        self
    }
}

fn range_value(offset: Option<u64>, length: Option<u64>) -> Option<String> {
    let offset = offset.unwrap_or(0);
    match length {
        Some(l) => Some(format!("bytes={}-{}", offset, offset + l - 1)),
        None if offset > 0 => Some(format!("bytes={offset}-")),
        None => None,
    }
}

impl S3Api for GetObject {
    type S3Response = GetObjectResponse;
}

impl ToS3Request for GetObject {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        if let Some(l) = self.length {
            if l == 0 {
                return Err(Error::argument("length must be greater than zero"));
            }
        }

        if self.ssec.is_some() && !self.client.is_secure() {
            return Err(Error::argument(
                "SSE-C operations must be performed over a secure connection",
            ));
        }

        let mut headers = self.extra_headers.unwrap_or_default();
        merge(
            &mut headers,
            &object_conditional_headers(
                self.ssec.as_ref(),
                self.match_etag.as_ref(),
                self.not_match_etag.as_ref(),
                self.modified_since,
                self.unmodified_since,
            ),
        );
        if let Some(range) = range_value(self.offset, self.length) {
            headers.add(RANGE, range);
        }

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers))
    }
}

/// Downloads an object to a local file, resuming a previous partial
/// download when possible.
///
/// Partial content is staged in `<path>.<etag>.part.minio` next to the
/// destination; on completion the temp file is atomically renamed over the
/// destination.
pub struct DownloadObject {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    version_id: Option<String>,
    ssec: Option<SseCustomerKey>,
    filename: PathBuf,
}

impl DownloadObject {
    pub fn new(client: Client, bucket: &str, object: &str, filename: &Path) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: None,
            ssec: None,
            filename: filename.to_path_buf(),
        }
    }

    pub fn extra_headers(mut self, extra_headers: Option<Multimap>) -> Self {
        self.extra_headers = extra_headers;
        self
    }

    pub fn extra_query_params(mut self, extra_query_params: Option<Multimap>) -> Self {
        self.extra_query_params = extra_query_params;
        self
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn version_id(mut self, version_id: Option<String>) -> Self {
        self.version_id = version_id;
        self
    }

    pub fn ssec(mut self, ssec: Option<SseCustomerKey>) -> Self {
        self.ssec = ssec;
        self
    }

    pub async fn send(self) -> Result<DownloadObjectResponse, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let stat: StatObjectResponse = self
            .client
            .stat_object(&self.bucket, &self.object)
            .region(self.region.clone())
            .version_id(self.version_id.clone())
            .ssec(self.ssec.clone())
            .send()
            .await?;

        // Nothing to do if the destination is already the whole object;
        // anything larger than the remote object cannot be a prior download.
        if let Ok(meta) = tokio::fs::metadata(&self.filename).await {
            if meta.len() == stat.size {
                return Ok(DownloadObjectResponse {
                    bucket: self.bucket,
                    object: self.object,
                    etag: stat.etag,
                    object_size: stat.size,
                    filename: self.filename,
                    skipped: true,
                });
            }
            if meta.len() > stat.size {
                return Err(Error::argument(format!(
                    "destination {:?} is larger ({} bytes) than the remote object ({} bytes)",
                    self.filename,
                    meta.len(),
                    stat.size
                ))
                .with_bucket(self.bucket)
                .with_object(self.object));
            }
        }

        if let Some(parent) = self.filename.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // The temp file carries the ETag so a changed object never resumes
        // onto stale bytes.
        let mut temp_name = self.filename.as_os_str().to_os_string();
        temp_name.push(format!(".{}.part.minio", stat.etag));
        let temp_path = PathBuf::from(temp_name);

        let mut offset = match tokio::fs::metadata(&temp_path).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        if offset > stat.size {
            tokio::fs::remove_file(&temp_path).await?;
            offset = 0;
        }

        if offset < stat.size || stat.size == 0 {
            let resp: GetObjectResponse = {
                let mut req = self
                    .client
                    .get_object(&self.bucket, &self.object)
                    .region(self.region.clone())
                    .version_id(self.version_id.clone())
                    .ssec(self.ssec.clone())
                    .match_etag(Some(stat.etag.clone()))
                    .extra_headers(self.extra_headers.clone())
                    .extra_query_params(self.extra_query_params.clone());
                if offset > 0 {
                    req = req.offset(Some(offset));
                }
                req.send().await?
            };

            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&temp_path)
                .await?;

            let mut stream = resp.into_byte_stream();
            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk?).await?;
            }
            file.flush().await?;
        }

        tokio::fs::rename(&temp_path, &self.filename).await?;

        Ok(DownloadObjectResponse {
            bucket: self.bucket,
            object: self.object,
            etag: stat.etag,
            object_size: stat.size,
            filename: self.filename,
            skipped: false,
        })
    }
}
