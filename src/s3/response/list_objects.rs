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

//! Responses of the ListObjects APIs.

use crate::s3::error::Error;
use crate::s3::types::{FromS3Response, ListEntry, S3Request};
use crate::s3::utils::{from_iso8601utc, get_default_text, get_option_text, trim_quotes, url_decode};
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

fn decode_if_needed(encoding_type: Option<&String>, value: String) -> Result<String, Error> {
    match encoding_type {
        Some(v) if v == "url" => Ok(url_decode(&value)
            .map_err(|e| Error::protocol(format!("invalid url-encoded listing value: {e}")))?
            .to_string()),
        _ => Ok(value),
    }
}

fn parse_list_entries(
    contents: &mut Vec<ListEntry>,
    root: &Element,
    encoding_type: Option<&String>,
) -> Result<(), Error> {
    for child in &root.children {
        let Some(element) = child.as_element() else {
            continue;
        };
        match element.name.as_str() {
            "Contents" => {
                let key =
                    decode_if_needed(encoding_type, get_default_text(element, "Key"))?;
                let last_modified = match get_option_text(element, "LastModified") {
                    Some(v) if !v.is_empty() => Some(from_iso8601utc(&v)?),
                    _ => None,
                };
                let size = get_option_text(element, "Size")
                    .map(|v| v.parse::<u64>())
                    .transpose()?;
                let (owner_id, owner_name) = element
                    .get_child("Owner")
                    .map(|v| (get_option_text(v, "ID"), get_option_text(v, "DisplayName")))
                    .unwrap_or((None, None));

                contents.push(ListEntry {
                    name: key,
                    last_modified,
                    etag: get_option_text(element, "ETag").map(|v| trim_quotes(&v).to_string()),
                    owner_id,
                    owner_name,
                    size,
                    storage_class: get_option_text(element, "StorageClass"),
                    is_latest: false,
                    version_id: None,
                    user_metadata: None,
                    is_prefix: false,
                    is_delete_marker: false,
                    encoding_type: encoding_type.cloned(),
                });
            }
            "CommonPrefixes" => {
                // Prefixes surface as synthetic directory entries with no
                // size and a trailing '/'.
                let prefix =
                    decode_if_needed(encoding_type, get_default_text(element, "Prefix"))?;
                contents.push(ListEntry {
                    name: prefix,
                    is_prefix: true,
                    encoding_type: encoding_type.cloned(),
                    ..Default::default()
                });
            }
            _ => {}
        }
    }

    Ok(())
}

struct ListPage {
    headers: HeaderMap,
    name: String,
    encoding_type: Option<String>,
    prefix: Option<String>,
    delimiter: Option<String>,
    is_truncated: bool,
    max_keys: Option<u16>,
    contents: Vec<ListEntry>,
    root: Element,
}

async fn parse_common_page(resp: Result<reqwest::Response, Error>) -> Result<ListPage, Error> {
    let mut resp = resp?;
    let headers: HeaderMap = mem::take(resp.headers_mut());
    let body = resp.bytes().await?;
    let root = Element::parse(body.reader())?;

    let encoding_type = get_option_text(&root, "EncodingType");
    let prefix = get_option_text(&root, "Prefix")
        .map(|v| decode_if_needed(encoding_type.as_ref(), v))
        .transpose()?;
    let is_truncated = get_option_text(&root, "IsTruncated")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);
    let max_keys = get_option_text(&root, "MaxKeys")
        .map(|v| v.parse::<u16>())
        .transpose()?;

    let mut contents = Vec::new();
    parse_list_entries(&mut contents, &root, encoding_type.as_ref())?;

    Ok(ListPage {
        headers,
        name: get_default_text(&root, "Name"),
        encoding_type,
        prefix,
        delimiter: get_option_text(&root, "Delimiter"),
        is_truncated,
        max_keys,
        contents,
        root,
    })
}

/// Response of the ListObjects (version 1) S3 API
#[derive(Clone, Debug)]
pub struct ListObjectsV1Response {
    pub headers: HeaderMap,
    pub name: String,
    pub encoding_type: Option<String>,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub is_truncated: bool,
    pub max_keys: Option<u16>,
    pub contents: Vec<ListEntry>,
    pub marker: Option<String>,
    pub next_marker: Option<String>,
}

#[async_trait]
impl FromS3Response for ListObjectsV1Response {
    async fn from_s3response(
        _req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let page = parse_common_page(resp).await?;

        let marker = get_option_text(&page.root, "Marker")
            .map(|v| decode_if_needed(page.encoding_type.as_ref(), v))
            .transpose()?;
        let mut next_marker = get_option_text(&page.root, "NextMarker")
            .map(|v| decode_if_needed(page.encoding_type.as_ref(), v))
            .transpose()?;
        // Without a delimiter the service omits NextMarker; the last
        // returned key continues the listing.
        if page.is_truncated && next_marker.is_none() {
            next_marker = page.contents.iter().rev().find(|v| !v.is_prefix).map(|v| v.name.clone());
        }

        Ok(Self {
            headers: page.headers,
            name: page.name,
            encoding_type: page.encoding_type,
            prefix: page.prefix,
            delimiter: page.delimiter,
            is_truncated: page.is_truncated,
            max_keys: page.max_keys,
            contents: page.contents,
            marker,
            next_marker,
        })
    }
}

/// Response of the ListObjectsV2 S3 API
#[derive(Clone, Debug)]
pub struct ListObjectsV2Response {
    pub headers: HeaderMap,
    pub name: String,
    pub encoding_type: Option<String>,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub is_truncated: bool,
    pub max_keys: Option<u16>,
    pub contents: Vec<ListEntry>,
    pub key_count: Option<u16>,
    pub start_after: Option<String>,
    pub continuation_token: Option<String>,
    pub next_continuation_token: Option<String>,
}

#[async_trait]
impl FromS3Response for ListObjectsV2Response {
    async fn from_s3response(
        _req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let page = parse_common_page(resp).await?;

        Ok(Self {
            headers: page.headers,
            name: page.name,
            key_count: get_option_text(&page.root, "KeyCount")
                .map(|v| v.parse::<u16>())
                .transpose()?,
            start_after: get_option_text(&page.root, "StartAfter")
                .map(|v| decode_if_needed(page.encoding_type.as_ref(), v))
                .transpose()?,
            continuation_token: get_option_text(&page.root, "ContinuationToken"),
            next_continuation_token: get_option_text(&page.root, "NextContinuationToken"),
            encoding_type: page.encoding_type,
            prefix: page.prefix,
            delimiter: page.delimiter,
            is_truncated: page.is_truncated,
            max_keys: page.max_keys,
            contents: page.contents,
        })
    }
}

/// Unified response of the object listing APIs
#[derive(Clone, Debug)]
pub struct ListObjectsResponse {
    pub headers: HeaderMap,
    pub name: String,
    pub encoding_type: Option<String>,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub is_truncated: bool,
    pub max_keys: Option<u16>,
    pub contents: Vec<ListEntry>,

    // ListObjects version 1
    pub marker: Option<String>,
    pub next_marker: Option<String>,

    // ListObjectsV2
    pub key_count: Option<u16>,
    pub start_after: Option<String>,
    pub continuation_token: Option<String>,
    pub next_continuation_token: Option<String>,
}

impl From<ListObjectsV1Response> for ListObjectsResponse {
    fn from(value: ListObjectsV1Response) -> Self {
        Self {
            headers: value.headers,
            name: value.name,
            encoding_type: value.encoding_type,
            prefix: value.prefix,
            delimiter: value.delimiter,
            is_truncated: value.is_truncated,
            max_keys: value.max_keys,
            contents: value.contents,
            marker: value.marker,
            next_marker: value.next_marker,
            key_count: None,
            start_after: None,
            continuation_token: None,
            next_continuation_token: None,
        }
    }
}

impl From<ListObjectsV2Response> for ListObjectsResponse {
    fn from(value: ListObjectsV2Response) -> Self {
        Self {
            headers: value.headers,
            name: value.name,
            encoding_type: value.encoding_type,
            prefix: value.prefix,
            delimiter: value.delimiter,
            is_truncated: value.is_truncated,
            max_keys: value.max_keys,
            contents: value.contents,
            marker: None,
            next_marker: None,
            key_count: value.key_count,
            start_after: value.start_after,
            continuation_token: value.continuation_token,
            next_continuation_token: value.next_continuation_token,
        }
    }
}
