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

//! Responses of bucket-level APIs.

use crate::s3::error::{Error, ErrorCode};
use crate::s3::types::{Bucket, FromS3Response, S3Request};
use crate::s3::utils::{from_iso8601utc, get_default_text, get_option_text};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of the CreateBucket S3 API
#[derive(Clone, Debug)]
pub struct CreateBucketResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub region: String,
}

#[async_trait]
impl FromS3Response for CreateBucketResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let bucket = req.bucket.clone().unwrap_or_default();
        let region = req.inner_region.clone();

        // Seed the region cache so the first operation against the new
        // bucket skips location discovery.
        req.client.add_bucket_region(&bucket, region.clone());

        Ok(Self {
            headers: mem::take(resp.headers_mut()),
            bucket,
            region,
        })
    }
}

/// Response of the DeleteBucket S3 API
#[derive(Clone, Debug)]
pub struct DeleteBucketResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

#[async_trait]
impl FromS3Response for DeleteBucketResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let bucket = req.bucket.clone().unwrap_or_default();
        req.client.remove_bucket_region(&bucket);

        Ok(Self {
            headers: mem::take(resp.headers_mut()),
            bucket,
        })
    }
}

/// Response of the HeadBucket S3 API
#[derive(Clone, Debug)]
pub struct BucketExistsResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub exists: bool,
}

#[async_trait]
impl FromS3Response for BucketExistsResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let bucket = req.bucket.clone().unwrap_or_default();
        match resp {
            Ok(mut v) => Ok(Self {
                headers: mem::take(v.headers_mut()),
                bucket,
                exists: true,
            }),
            Err(e) if e.code() == Some(&ErrorCode::NoSuchBucket) => Ok(Self {
                headers: HeaderMap::new(),
                bucket,
                exists: false,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Response of the ListBuckets S3 API
#[derive(Clone, Debug)]
pub struct ListBucketsResponse {
    pub headers: HeaderMap,
    pub buckets: Vec<Bucket>,
}

#[async_trait]
impl FromS3Response for ListBucketsResponse {
    async fn from_s3response(
        _req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let mut buckets = Vec::new();
        if let Some(list) = root.get_child("Buckets") {
            for child in &list.children {
                let Some(element) = child.as_element() else {
                    continue;
                };
                if element.name != "Bucket" {
                    continue;
                }
                let creation_date = match get_option_text(element, "CreationDate") {
                    Some(v) if !v.is_empty() => Some(from_iso8601utc(&v)?),
                    _ => None,
                };
                buckets.push(Bucket {
                    name: get_default_text(element, "Name"),
                    creation_date,
                });
            }
        }

        Ok(Self { headers, buckets })
    }
}
