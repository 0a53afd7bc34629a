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

//! Responses of the multipart upload listing APIs.

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, MultipartUpload, PartInfo, S3Request};
use crate::s3::utils::{from_iso8601utc, get_default_text, get_option_text, trim_quotes};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

/// Response of the ListMultipartUploads S3 API
#[derive(Clone, Debug)]
pub struct ListMultipartUploadsResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub key_marker: Option<String>,
    pub upload_id_marker: Option<String>,
    pub next_key_marker: Option<String>,
    pub next_upload_id_marker: Option<String>,
    pub max_uploads: Option<u16>,
    pub is_truncated: bool,
    pub uploads: Vec<MultipartUpload>,
}

#[async_trait]
impl FromS3Response for ListMultipartUploadsResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let mut uploads = Vec::new();
        for child in &root.children {
            let Some(element) = child.as_element() else {
                continue;
            };
            if element.name != "Upload" {
                continue;
            }
            let initiated = match get_option_text(element, "Initiated") {
                Some(v) if !v.is_empty() => Some(from_iso8601utc(&v)?),
                _ => None,
            };
            uploads.push(MultipartUpload {
                key: get_default_text(element, "Key"),
                upload_id: get_default_text(element, "UploadId"),
                initiator_id: element
                    .get_child("Initiator")
                    .and_then(|v| get_option_text(v, "ID")),
                owner_id: element
                    .get_child("Owner")
                    .and_then(|v| get_option_text(v, "ID")),
                storage_class: get_option_text(element, "StorageClass"),
                initiated,
                aggregated_part_size: None,
            });
        }

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            key_marker: get_option_text(&root, "KeyMarker"),
            upload_id_marker: get_option_text(&root, "UploadIdMarker"),
            next_key_marker: get_option_text(&root, "NextKeyMarker"),
            next_upload_id_marker: get_option_text(&root, "NextUploadIdMarker"),
            max_uploads: get_option_text(&root, "MaxUploads")
                .map(|v| v.parse::<u16>())
                .transpose()?,
            is_truncated: get_option_text(&root, "IsTruncated")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            uploads,
        })
    }
}

/// Response of the ListParts S3 API
#[derive(Clone, Debug)]
pub struct ListPartsResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub object: String,
    pub upload_id: String,
    pub part_number_marker: Option<u16>,
    pub next_part_number_marker: Option<u16>,
    pub max_parts: Option<u16>,
    pub is_truncated: bool,
    pub parts: Vec<PartInfo>,
}

#[async_trait]
impl FromS3Response for ListPartsResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers: HeaderMap = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let mut parts = Vec::new();
        for child in &root.children {
            let Some(element) = child.as_element() else {
                continue;
            };
            if element.name != "Part" {
                continue;
            }
            parts.push(PartInfo {
                number: get_default_text(element, "PartNumber").parse::<u16>()?,
                etag: trim_quotes(&get_default_text(element, "ETag")).to_string(),
                size: get_default_text(element, "Size").parse::<u64>()?,
            });
        }

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            object: req.object.clone().unwrap_or_default(),
            upload_id: get_default_text(&root, "UploadId"),
            part_number_marker: get_option_text(&root, "PartNumberMarker")
                .and_then(|v| v.parse::<u16>().ok()),
            next_part_number_marker: get_option_text(&root, "NextPartNumberMarker")
                .and_then(|v| v.parse::<u16>().ok()),
            max_parts: get_option_text(&root, "MaxParts")
                .map(|v| v.parse::<u16>())
                .transpose()?,
            is_truncated: get_option_text(&root, "IsTruncated")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            parts,
        })
    }
}
