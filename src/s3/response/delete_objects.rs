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

//! Responses of object deletion APIs.

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, S3Request};
use crate::s3::utils::{get_default_text, get_option_text};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of the DeleteObject S3 API
#[derive(Clone, Debug)]
pub struct DeleteObjectResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub delete_marker: bool,
}

#[async_trait]
impl FromS3Response for DeleteObjectResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());

        let version_id = headers
            .get("x-amz-version-id")
            .map(|v| v.to_str())
            .transpose()?
            .map(String::from);

        let delete_marker = headers
            .get("x-amz-delete-marker")
            .map(|v| v.to_str())
            .transpose()?
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            version_id,
            delete_marker,
        })
    }
}

/// One successfully removed object of a bulk delete
#[derive(Clone, Debug, Default)]
pub struct DeletedObject {
    pub key: String,
    pub version_id: Option<String>,
    pub delete_marker: bool,
    pub delete_marker_version_id: Option<String>,
}

/// One failed removal of a bulk delete
#[derive(Clone, Debug, Default)]
pub struct DeleteError {
    pub code: String,
    pub message: String,
    pub key: String,
    pub version_id: Option<String>,
}

/// Response of the bulk DeleteObjects S3 API
#[derive(Clone, Debug)]
pub struct DeleteObjectsResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub deleted: Vec<DeletedObject>,
    pub errors: Vec<DeleteError>,
}

#[async_trait]
impl FromS3Response for DeleteObjectsResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let mut deleted = Vec::new();
        let mut errors = Vec::new();
        for child in &root.children {
            let Some(element) = child.as_element() else {
                continue;
            };
            match element.name.as_str() {
                "Deleted" => deleted.push(DeletedObject {
                    key: get_default_text(element, "Key"),
                    version_id: get_option_text(element, "VersionId"),
                    delete_marker: get_default_text(element, "DeleteMarker") == "true",
                    delete_marker_version_id: get_option_text(element, "DeleteMarkerVersionId"),
                }),
                "Error" => errors.push(DeleteError {
                    code: get_default_text(element, "Code"),
                    message: get_default_text(element, "Message"),
                    key: get_default_text(element, "Key"),
                    version_id: get_option_text(element, "VersionId"),
                }),
                _ => {}
            }
        }

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            deleted,
            errors,
        })
    }
}
