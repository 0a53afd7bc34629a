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

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::CONTENT_MD5;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::SelectObjectContentResponse;
use crate::s3::sse::SseCustomerKey;
use crate::s3::types::{S3Api, S3Request, SelectRequest, ToS3Request};
use crate::s3::utils::{check_bucket_name, check_object_name, insert, md5sum_hash};
use bytes::Bytes;
use http::Method;

/// Argument builder for the SelectObjectContent S3 API
pub struct SelectObjectContent {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    version_id: Option<String>,
    ssec: Option<SseCustomerKey>,
    request: SelectRequest,
}

impl SelectObjectContent {
    pub fn new(client: Client, bucket: &str, object: &str, request: SelectRequest) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: None,
            ssec: None,
            request,
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
}

impl S3Api for SelectObjectContent {
    type S3Response = SelectObjectContentResponse;
}

impl ToS3Request for SelectObjectContent {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.request.expr.is_empty() {
            return Err(Error::argument("select expression cannot be empty"));
        }

        if self.ssec.is_some() && !self.client.is_secure() {
            return Err(Error::argument(
                "SSE-C operations must be performed over a secure connection",
            ));
        }

        let bytes: Bytes = self.request.to_xml().into();

        let mut headers: Multimap = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_MD5, md5sum_hash(bytes.as_ref()));
        if let Some(v) = &self.ssec {
            use crate::s3::sse::Sse;
            crate::s3::utils::merge(&mut headers, &v.headers());
        }

        let mut query_params: Multimap = insert(self.extra_query_params, "select");
        query_params.add("select-type", "2");
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::POST)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers)
            .body(Some(bytes.into())))
    }
}
