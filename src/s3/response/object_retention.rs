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

//! Responses of per-object retention and legal-hold APIs.

use crate::s3::error::{Error, ErrorCode};
use crate::s3::types::{FromS3Response, Retention, RetentionMode, S3Request, parse_legal_hold};
use crate::s3::utils::{from_iso8601utc, get_option_text};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of the GetObjectRetention S3 API. An object without a retention
/// configuration yields `None`.
#[derive(Clone, Debug)]
pub struct GetObjectRetentionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub retention: Option<Retention>,
}

#[async_trait]
impl FromS3Response for GetObjectRetentionResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let bucket = req.bucket.clone().unwrap_or_default();
        let object = req.object.clone().unwrap_or_default();

        match resp {
            Ok(mut v) => {
                let headers = mem::take(v.headers_mut());
                let body = v.bytes().await?;
                let root = Element::parse(body.reader())?;

                let retention = match (
                    get_option_text(&root, "Mode"),
                    get_option_text(&root, "RetainUntilDate"),
                ) {
                    (Some(mode), Some(date)) => Some(Retention {
                        mode: RetentionMode::parse(&mode)?,
                        retain_until_date: from_iso8601utc(&date)?,
                    }),
                    _ => None,
                };

                Ok(Self {
                    headers,
                    bucket,
                    object,
                    retention,
                })
            }
            Err(e) if e.code() == Some(&ErrorCode::NoSuchObjectLockConfiguration) => Ok(Self {
                headers: HeaderMap::new(),
                bucket,
                object,
                retention: None,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Response of the PutObjectRetention S3 API
#[derive(Clone, Debug)]
pub struct SetObjectRetentionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
}

#[async_trait]
impl FromS3Response for SetObjectRetentionResponse {
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

/// Response of the GetObjectLegalHold S3 API
#[derive(Clone, Debug)]
pub struct GetObjectLegalHoldResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub enabled: bool,
}

#[async_trait]
impl FromS3Response for GetObjectLegalHoldResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let bucket = req.bucket.clone().unwrap_or_default();
        let object = req.object.clone().unwrap_or_default();

        match resp {
            Ok(mut v) => {
                let headers = mem::take(v.headers_mut());
                let body = v.bytes().await?;
                let root = Element::parse(body.reader())?;
                let enabled = get_option_text(&root, "Status")
                    .map(|v| parse_legal_hold(&v))
                    .transpose()?
                    .unwrap_or(false);

                Ok(Self {
                    headers,
                    bucket,
                    object,
                    enabled,
                })
            }
            Err(e) if e.code() == Some(&ErrorCode::NoSuchObjectLockConfiguration) => Ok(Self {
                headers: HeaderMap::new(),
                bucket,
                object,
                enabled: false,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Response of the PutObjectLegalHold S3 API
#[derive(Clone, Debug)]
pub struct SetObjectLegalHoldResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
}

#[async_trait]
impl FromS3Response for SetObjectLegalHoldResponse {
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
