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

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::StatObjectResponse;
use crate::s3::sse::SseCustomerKey;
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::{
    UtcTime, check_bucket_name, check_object_name, merge, to_http_header_value,
};
use http::Method;

/// Argument builder for the HeadObject S3 API
pub struct StatObject {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    version_id: Option<String>,
    ssec: Option<SseCustomerKey>,
    match_etag: Option<String>,
    not_match_etag: Option<String>,
    modified_since: Option<UtcTime>,
    unmodified_since: Option<UtcTime>,
}

impl StatObject {
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

    /// Reads only accept customer-supplied keys; bucket-default encryption
    /// applies otherwise.
    pub fn ssec(mut self, ssec: Option<SseCustomerKey>) -> Self {
        self.ssec = ssec;
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

pub(crate) fn object_conditional_headers(
    ssec: Option<&SseCustomerKey>,
    match_etag: Option<&String>,
    not_match_etag: Option<&String>,
    modified_since: Option<UtcTime>,
    unmodified_since: Option<UtcTime>,
) -> Multimap {
    let mut headers = Multimap::new();
    if let Some(v) = ssec {
        use crate::s3::sse::Sse;
        merge(&mut headers, &v.headers());
    }
    if let Some(v) = match_etag {
        headers.add(IF_MATCH, v.clone());
    }
    if let Some(v) = not_match_etag {
        headers.add(IF_NONE_MATCH, v.clone());
    }
    if let Some(v) = modified_since {
        headers.add(IF_MODIFIED_SINCE, to_http_header_value(v));
    }
    if let Some(v) = unmodified_since {
        headers.add(IF_UNMODIFIED_SINCE, to_http_header_value(v));
    }
    headers
}

impl S3Api for StatObject {
    type S3Response = StatObjectResponse;
}

impl ToS3Request for StatObject {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

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

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::HEAD)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers))
    }
}
