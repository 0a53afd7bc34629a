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

//! Responses of server-side copy APIs. The copy result document is parsed
//! so the returned ETag is usable for multipart copy composition.

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, S3Request};
use crate::s3::utils::{get_option_text, trim_quotes};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

async fn parse_copy_result(
    req: S3Request,
    resp: Result<reqwest::Response, Error>,
) -> Result<(HeaderMap, String, String, String, String, Option<String>), Error> {
    let mut resp = resp?;
    let headers: HeaderMap = mem::take(resp.headers_mut());

    let version_id = headers
        .get("x-amz-version-id")
        .map(|v| v.to_str())
        .transpose()?
        .map(String::from);

    // CopyObjectResult / CopyPartResult carry the destination ETag in the
    // body, not in the ETag header.
    let body = resp.bytes().await?;
    let root = Element::parse(body.reader())?;
    let etag = get_option_text(&root, "ETag")
        .map(|v| trim_quotes(&v).to_string())
        .unwrap_or_default();

    Ok((
        headers,
        req.bucket.clone().unwrap_or_default(),
        req.object.clone().unwrap_or_default(),
        req.inner_region.clone(),
        etag,
        version_id,
    ))
}

/// Response of the CopyObject S3 API
#[derive(Clone, Debug)]
pub struct CopyObjectResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub region: String,
    pub etag: String,
    pub version_id: Option<String>,
}

#[async_trait]
impl FromS3Response for CopyObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, bucket, object, region, etag, version_id) =
            parse_copy_result(req, resp).await?;
        Ok(Self {
            headers,
            bucket,
            object,
            region,
            etag,
            version_id,
        })
    }
}

/// Response of the UploadPartCopy S3 API
#[derive(Clone, Debug)]
pub struct UploadPartCopyResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub etag: String,
}

#[async_trait]
impl FromS3Response for UploadPartCopyResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, bucket, object, _, etag, _) = parse_copy_result(req, resp).await?;
        Ok(Self {
            headers,
            bucket,
            object,
            etag,
        })
    }
}

/// Response of a compose operation
#[derive(Clone, Debug)]
pub struct ComposeObjectResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub region: String,
    pub etag: String,
    pub version_id: Option<String>,
}

#[async_trait]
impl FromS3Response for ComposeObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let (headers, bucket, object, region, etag, version_id) =
            parse_copy_result(req, resp).await?;
        Ok(Self {
            headers,
            bucket,
            object,
            region,
            etag,
            version_id,
        })
    }
}
