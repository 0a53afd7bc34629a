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

use crate::s3::client::DEFAULT_REGION;
use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, S3Request};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of the GetBucketLocation S3 API
#[derive(Clone, Debug)]
pub struct GetRegionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    /// The bucket's region. An empty location constraint resolves to the
    /// default region; the legacy `EU` constraint aliases to `eu-west-1`.
    pub region_response: String,
}

#[async_trait]
impl FromS3Response for GetRegionResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let bucket = req
            .bucket
            .clone()
            .ok_or_else(|| Error::argument("no bucket specified"))?;
        let mut resp = resp?;

        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let text = root.get_text().map(|v| v.to_string()).unwrap_or_default();
        let location = match text.as_str() {
            "" => String::from(DEFAULT_REGION),
            "EU" => String::from("eu-west-1"),
            v => String::from(v),
        };

        Ok(GetRegionResponse {
            headers,
            bucket,
            region_response: location,
        })
    }
}
