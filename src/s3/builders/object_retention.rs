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

//! Argument builders for per-object retention and legal-hold APIs.

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{
    GetObjectLegalHoldResponse, GetObjectRetentionResponse, SetObjectLegalHoldResponse,
    SetObjectRetentionResponse,
};
use crate::s3::types::{Retention, S3Api, S3Request, ToS3Request};
use crate::s3::utils::{check_bucket_name, check_object_name, insert, md5sum_hash, to_iso8601utc};
use bytes::Bytes;
use http::Method;

macro_rules! object_subresource_builder {
    ($(#[$doc:meta])* $name:ident $(, $field:ident: $ftype:ty)*) => {
        $(#[$doc])*
        pub struct $name {
            client: Client,

            extra_headers: Option<Multimap>,
            extra_query_params: Option<Multimap>,
            region: Option<String>,
            bucket: String,
            object: String,
            version_id: Option<String>,
            $($field: $ftype,)*
        }

        impl $name {
            pub fn new(client: Client, bucket: &str, object: &str $(, $field: $ftype)*) -> Self {
                Self {
                    client,
                    extra_headers: None,
                    extra_query_params: None,
                    region: None,
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                    version_id: None,
                    $($field,)*
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
        }
    };
}

object_subresource_builder!(
    /// Argument builder for the GetObjectRetention S3 API
    GetObjectRetention
);

impl S3Api for GetObjectRetention {
    type S3Response = GetObjectRetentionResponse;
}

impl ToS3Request for GetObjectRetention {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let mut query_params = insert(self.extra_query_params, "retention");
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

object_subresource_builder!(
    /// Argument builder for the PutObjectRetention S3 API
    SetObjectRetention,
    retention: Option<Retention>
);

impl SetObjectRetention {
    /// Bypass governance-mode protection while changing retention.
    pub fn bypass_governance_mode(mut self, bypass: bool) -> Self {
        if bypass {
            let mut headers = self.extra_headers.unwrap_or_default();
            headers.add(X_AMZ_BYPASS_GOVERNANCE_RETENTION, "true");
            self.extra_headers = Some(headers);
        }
        self
    }
}

impl S3Api for SetObjectRetention {
    type S3Response = SetObjectRetentionResponse;
}

impl ToS3Request for SetObjectRetention {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let mut data = String::from("<Retention>");
        if let Some(v) = &self.retention {
            data.push_str("<Mode>");
            data.push_str(&v.mode.to_string());
            data.push_str("</Mode>");
            data.push_str("<RetainUntilDate>");
            data.push_str(&to_iso8601utc(v.retain_until_date));
            data.push_str("</RetainUntilDate>");
        }
        data.push_str("</Retention>");
        let body = Bytes::from(data);

        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_MD5, md5sum_hash(&body));
        headers.add(CONTENT_TYPE, "application/xml");

        let mut query_params = insert(self.extra_query_params, "retention");
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::PUT)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers)
            .body(Some(body.into())))
    }
}

object_subresource_builder!(
    /// Argument builder for the GetObjectLegalHold S3 API
    GetObjectLegalHold
);

impl S3Api for GetObjectLegalHold {
    type S3Response = GetObjectLegalHoldResponse;
}

impl ToS3Request for GetObjectLegalHold {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let mut query_params = insert(self.extra_query_params, "legal-hold");
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

object_subresource_builder!(
    /// Argument builder for the PutObjectLegalHold S3 API
    SetObjectLegalHold,
    legal_hold: bool
);

impl S3Api for SetObjectLegalHold {
    type S3Response = SetObjectLegalHoldResponse;
}

impl ToS3Request for SetObjectLegalHold {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let body = Bytes::from(format!(
            "<LegalHold><Status>{}</Status></LegalHold>",
            if self.legal_hold { "ON" } else { "OFF" }
        ));

        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_MD5, md5sum_hash(&body));
        headers.add(CONTENT_TYPE, "application/xml");

        let mut query_params = insert(self.extra_query_params, "legal-hold");
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::PUT)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers)
            .body(Some(body.into())))
    }
}
