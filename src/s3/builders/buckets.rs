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

//! Argument builders for bucket-level APIs.

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{
    BucketExistsResponse, CreateBucketResponse, DeleteBucketResponse, ListBucketsResponse,
};
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::check_bucket_name;
use bytes::Bytes;
use http::Method;

/// Argument builder for the CreateBucket S3 API
pub struct CreateBucket {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object_lock: bool,
}

impl CreateBucket {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object_lock: false,
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

    /// The region to create the bucket in. Must agree with the client's
    /// configured region when both are set.
    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Enable object locking on the new bucket.
    pub fn object_lock(mut self, object_lock: bool) -> Self {
        self.object_lock = object_lock;
        self
    }
}

impl S3Api for CreateBucket {
    type S3Response = CreateBucketResponse;
}

impl ToS3Request for CreateBucket {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        if let (Some(configured), Some(requested)) =
            (self.client.configured_region(), self.region.as_deref())
        {
            if configured != requested {
                return Err(Error::argument(format!(
                    "region must be {configured}, but passed {requested}"
                )));
            }
        }
        let region = self
            .region
            .or_else(|| self.client.configured_region().map(String::from))
            .unwrap_or_else(|| crate::s3::client::DEFAULT_REGION.to_string());

        let mut headers = self.extra_headers.unwrap_or_default();
        if self.object_lock {
            headers.add(X_AMZ_BUCKET_OBJECT_LOCK_ENABLED, "true");
        }

        // us-east-1 is the implied location; any other region travels in
        // the request body.
        let body: Option<Bytes> = (region != crate::s3::client::DEFAULT_REGION).then(|| {
            Bytes::from(format!(
                "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><LocationConstraint>{region}</LocationConstraint></CreateBucketConfiguration>"
            ))
        });

        Ok(S3Request::new(self.client, Method::PUT)
            .region(Some(region))
            .bucket(Some(self.bucket))
            .query_params(self.extra_query_params.unwrap_or_default())
            .headers(headers)
            .body(body.map(Into::into)))
    }
}

/// Argument builder for the DeleteBucket S3 API
pub struct DeleteBucket {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
}

impl DeleteBucket {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
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
}

impl S3Api for DeleteBucket {
    type S3Response = DeleteBucketResponse;
}

impl ToS3Request for DeleteBucket {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        Ok(S3Request::new(self.client, Method::DELETE)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(self.extra_query_params.unwrap_or_default())
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

/// Argument builder for the HeadBucket S3 API
pub struct BucketExists {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
}

impl BucketExists {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
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
}

impl S3Api for BucketExists {
    type S3Response = BucketExistsResponse;
}

impl ToS3Request for BucketExists {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        Ok(S3Request::new(self.client, Method::HEAD)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(self.extra_query_params.unwrap_or_default())
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

/// Argument builder for the ListBuckets S3 API
pub struct ListBuckets {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
}

impl ListBuckets {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
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
}

impl S3Api for ListBuckets {
    type S3Response = ListBucketsResponse;
}

impl ToS3Request for ListBuckets {
    fn to_s3request(self) -> Result<S3Request, Error> {
        Ok(S3Request::new(self.client, Method::GET)
            .query_params(self.extra_query_params.unwrap_or_default())
            .headers(self.extra_headers.unwrap_or_default()))
    }
}
