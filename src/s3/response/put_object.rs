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

//! Responses of the object upload APIs.

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, S3Request};
use crate::s3::utils::{get_option_text, get_text, trim_quotes};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

fn header_etag(headers: &HeaderMap) -> Result<String, Error> {
    Ok(headers
        .get("etag")
        .map(|v| v.to_str())
        .transpose()?
        .map(trim_quotes)
        .unwrap_or_default()
        .to_string())
}

fn header_version_id(headers: &HeaderMap) -> Result<Option<String>, Error> {
    Ok(headers
        .get("x-amz-version-id")
        .map(|v| v.to_str())
        .transpose()?
        .map(String::from))
}

/// Response of the PutObject S3 API (and of the multipart driver).
#[derive(Clone, Debug)]
pub struct PutObjectResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub region: String,
    pub etag: String,
    pub version_id: Option<String>,
}

#[async_trait]
impl FromS3Response for PutObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let etag = header_etag(&headers)?;
        let version_id = header_version_id(&headers)?;

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            region: req.inner_region.clone(),
            etag,
            version_id,
        })
    }
}

/// Response of the UploadPart S3 API
#[derive(Clone, Debug)]
pub struct UploadPartResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub etag: String,
}

#[async_trait]
impl FromS3Response for UploadPartResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let etag = header_etag(&headers)?;

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            etag,
        })
    }
}

/// Response of the CreateMultipartUpload S3 API
#[derive(Clone, Debug)]
pub struct CreateMultipartUploadResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub region: String,
    pub upload_id: String,
}

#[async_trait]
impl FromS3Response for CreateMultipartUploadResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            region: req.inner_region.clone(),
            upload_id: get_text(&root, "UploadId")?,
        })
    }
}

/// Response of the AbortMultipartUpload S3 API
#[derive(Clone, Debug)]
pub struct AbortMultipartUploadResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
}

#[async_trait]
impl FromS3Response for AbortMultipartUploadResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        Ok(Self {
            headers: mem::take(resp.headers_mut()),
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
        })
    }
}

/// Response of the CompleteMultipartUpload S3 API
#[derive(Clone, Debug)]
pub struct CompleteMultipartUploadResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub region: String,
    pub location: Option<String>,
    pub etag: String,
    pub version_id: Option<String>,
}

#[async_trait]
impl FromS3Response for CompleteMultipartUploadResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let version_id = header_version_id(&headers)?;
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            region: req.inner_region.clone(),
            location: get_option_text(&root, "Location"),
            etag: trim_quotes(&get_text(&root, "ETag")?).to_string(),
            version_id,
        })
    }
}
