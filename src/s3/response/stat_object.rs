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
use crate::s3::header_constants::*;
use crate::s3::types::{FromS3Response, S3Request};
use crate::s3::utils::{UtcTime, from_http_header_value, trim_quotes};
use async_trait::async_trait;
use http::HeaderMap;
use std::collections::HashMap;
use std::mem;

/// Response of the HeadObject S3 API, the object's metadata.
#[derive(Clone, Debug)]
pub struct StatObjectResponse {
    pub headers: HeaderMap,
    pub region: String,
    pub bucket: String,
    pub object: String,
    pub size: u64,
    pub etag: String,
    pub version_id: Option<String>,
    pub last_modified: Option<UtcTime>,
    pub delete_marker: bool,
    pub user_metadata: HashMap<String, String>,
}

#[async_trait]
impl FromS3Response for StatObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());

        let size = match headers.get(CONTENT_LENGTH) {
            Some(v) => v.to_str()?.parse::<u64>()?,
            None => 0,
        };

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

        let last_modified = headers
            .get(LAST_MODIFIED)
            .map(|v| -> Result<UtcTime, Error> { from_http_header_value(v.to_str()?) })
            .transpose()?;

        let delete_marker = headers
            .get("x-amz-delete-marker")
            .map(|v| v.to_str())
            .transpose()?
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mut user_metadata = HashMap::new();
        for (key, value) in headers.iter() {
            if let Some(name) = key.as_str().strip_prefix("x-amz-meta-") {
                user_metadata.insert(name.to_string(), value.to_str()?.to_string());
            }
        }

        Ok(Self {
            headers,
            region: req.inner_region.clone(),
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            size,
            etag,
            version_id,
            last_modified,
            delete_marker,
            user_metadata,
        })
    }
}
