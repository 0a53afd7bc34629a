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

//! Argument builders for object deletion: single DELETE and the bulk
//! `?delete` API.

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{DeleteObjectResponse, DeleteObjectsResponse};
use crate::s3::types::{S3Api, S3Request, ToS3Request};
use crate::s3::utils::{check_bucket_name, check_object_name, insert, md5sum_hash};
use bytes::Bytes;
use http::Method;

/// Maximum number of objects accepted by one bulk delete request.
pub const MAX_DELETE_OBJECTS: usize = 1000;

/// One object to remove in a bulk delete.
#[derive(Clone, Debug, Default)]
pub struct ObjectToDelete {
    pub key: String,
    pub version_id: Option<String>,
}

impl From<&str> for ObjectToDelete {
    fn from(key: &str) -> Self {
        Self {
            key: key.to_string(),
            version_id: None,
        }
    }
}

/// Argument builder for the DeleteObject S3 API
pub struct DeleteObject {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    version_id: Option<String>,
    bypass_governance_mode: bool,
}

impl DeleteObject {
    pub fn new(client: Client, bucket: &str, object: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: None,
            bypass_governance_mode: false,
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

    pub fn bypass_governance_mode(mut self, bypass: bool) -> Self {
        self.bypass_governance_mode = bypass;
        self
    }
}

impl S3Api for DeleteObject {
    type S3Response = DeleteObjectResponse;
}

impl ToS3Request for DeleteObject {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let mut headers = self.extra_headers.unwrap_or_default();
        if self.bypass_governance_mode {
            headers.add(X_AMZ_BYPASS_GOVERNANCE_RETENTION, "true");
        }

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add_version(self.version_id);

        Ok(S3Request::new(self.client, Method::DELETE)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers))
    }
}

/// Argument builder for the bulk DeleteObjects S3 API
pub struct DeleteObjects {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    objects: Vec<ObjectToDelete>,
    bypass_governance_mode: bool,
    quiet: bool,
}

impl DeleteObjects {
    pub fn new(client: Client, bucket: &str, objects: Vec<ObjectToDelete>) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            objects,
            bypass_governance_mode: false,
            quiet: false,
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

    pub fn bypass_governance_mode(mut self, bypass: bool) -> Self {
        self.bypass_governance_mode = bypass;
        self
    }

    /// Quiet mode reports only failures in the response.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl S3Api for DeleteObjects {
    type S3Response = DeleteObjectsResponse;
}

impl ToS3Request for DeleteObjects {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        if self.objects.is_empty() {
            return Err(Error::argument("no objects provided for deletion"));
        }
        if self.objects.len() > MAX_DELETE_OBJECTS {
            return Err(Error::argument(format!(
                "cannot delete more than {MAX_DELETE_OBJECTS} objects per request"
            )));
        }
        for object in &self.objects {
            check_object_name(&object.key)?;
        }

        let mut data = String::from("<Delete>");
        if self.quiet {
            data.push_str("<Quiet>true</Quiet>");
        }
        for object in &self.objects {
            data.push_str("<Object><Key>");
            data.push_str(&object.key);
            data.push_str("</Key>");
            if let Some(v) = &object.version_id {
                data.push_str("<VersionId>");
                data.push_str(v);
                data.push_str("</VersionId>");
            }
            data.push_str("</Object>");
        }
        data.push_str("</Delete>");
        let body = Bytes::from(data);

        // Bulk delete is one of the operations the service requires a
        // Content-MD5 for.
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_MD5, md5sum_hash(&body));
        headers.add(CONTENT_TYPE, "application/xml");
        if self.bypass_governance_mode {
            headers.add(X_AMZ_BYPASS_GOVERNANCE_RETENTION, "true");
        }

        let query_params = insert(self.extra_query_params, "delete");

        Ok(S3Request::new(self.client, Method::POST)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(query_params)
            .headers(headers)
            .body(Some(body.into())))
    }
}
