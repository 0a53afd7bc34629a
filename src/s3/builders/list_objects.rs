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

//! Argument builders for the ListObjects APIs, exposed as restartable lazy
//! streams with automatic pagination.

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, stream as futures_stream};
use http::Method;

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::list_objects::{
    ListObjectsResponse, ListObjectsV1Response, ListObjectsV2Response,
};
use crate::s3::types::{S3Api, S3Request, ToS3Request, ToStream};
use crate::s3::utils::check_bucket_name;

fn add_common_list_objects_query_params(
    query_params: &mut Multimap,
    delimiter: Option<String>,
    disable_url_encoding: bool,
    max_keys: Option<u16>,
    prefix: Option<String>,
) {
    query_params.add("delimiter", delimiter.unwrap_or_default());
    query_params.add("max-keys", max_keys.unwrap_or(1000).to_string());
    query_params.add("prefix", prefix.unwrap_or_default());
    if !disable_url_encoding {
        query_params.add("encoding-type", "url");
    }
}

/// A non-recursive listing rolls entries up on the `/` delimiter.
fn delim_helper(delim: Option<String>, recursive: bool) -> Option<String> {
    if delim.is_some() {
        return delim;
    }
    match recursive {
        true => None,
        false => Some(String::from("/")),
    }
}

// region: list-objects-v1

/// Argument for the ListObjects (version 1) S3 API
#[derive(Clone)]
struct ListObjectsV1 {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    delimiter: Option<String>,
    disable_url_encoding: bool,
    max_keys: Option<u16>,
    prefix: Option<String>,
    marker: Option<String>,
}

#[async_trait]
impl ToStream for ListObjectsV1 {
    type Item = ListObjectsV1Response;

    async fn to_stream(self) -> Box<dyn Stream<Item = Result<Self::Item, Error>> + Unpin + Send> {
        Box::new(Box::pin(futures_stream::unfold(
            (self, false),
            move |(args, is_done)| async move {
                if is_done {
                    return None;
                }
                let mut args_for_next_request = args.clone();
                match args.send().await {
                    Ok(resp) => {
                        // The next page continues from where this one ended.
                        args_for_next_request.marker.clone_from(&resp.next_marker);
                        let is_done = !resp.is_truncated;
                        Some((Ok(resp), (args_for_next_request, is_done)))
                    }
                    Err(e) => Some((Err(e), (args_for_next_request, true))),
                }
            },
        )))
    }
}

impl S3Api for ListObjectsV1 {
    type S3Response = ListObjectsV1Response;
}

impl ToS3Request for ListObjectsV1 {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        let mut query_params: Multimap = self.extra_query_params.unwrap_or_default();
        add_common_list_objects_query_params(
            &mut query_params,
            self.delimiter,
            self.disable_url_encoding,
            self.max_keys,
            self.prefix,
        );
        if let Some(v) = self.marker {
            query_params.add("marker", v);
        }

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

impl From<ListObjects> for ListObjectsV1 {
    fn from(value: ListObjects) -> Self {
        ListObjectsV1 {
            client: value.client,
            extra_headers: value.extra_headers,
            extra_query_params: value.extra_query_params,
            region: value.region,
            bucket: value.bucket,
            delimiter: delim_helper(value.delimiter, value.recursive),
            disable_url_encoding: value.disable_url_encoding,
            max_keys: value.max_keys,
            prefix: value.prefix,
            marker: value.marker,
        }
    }
}

// endregion: list-objects-v1

// region: list-objects-v2

/// Argument for the ListObjectsV2 S3 API
#[derive(Clone)]
struct ListObjectsV2 {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    delimiter: Option<String>,
    disable_url_encoding: bool,
    max_keys: Option<u16>,
    prefix: Option<String>,
    start_after: Option<String>,
    continuation_token: Option<String>,
    fetch_owner: bool,
}

#[async_trait]
impl ToStream for ListObjectsV2 {
    type Item = ListObjectsV2Response;

    async fn to_stream(self) -> Box<dyn Stream<Item = Result<Self::Item, Error>> + Unpin + Send> {
        Box::new(Box::pin(futures_stream::unfold(
            (self, false),
            move |(args, is_done)| async move {
                if is_done {
                    return None;
                }
                let mut args_for_next_request = args.clone();
                match args.send().await {
                    Ok(resp) => {
                        args_for_next_request
                            .continuation_token
                            .clone_from(&resp.next_continuation_token);
                        let is_done = !resp.is_truncated;
                        Some((Ok(resp), (args_for_next_request, is_done)))
                    }
                    Err(e) => Some((Err(e), (args_for_next_request, true))),
                }
            },
        )))
    }
}

impl S3Api for ListObjectsV2 {
    type S3Response = ListObjectsV2Response;
}

impl ToS3Request for ListObjectsV2 {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        let mut query_params: Multimap = self.extra_query_params.unwrap_or_default();
        query_params.add("list-type", "2");
        add_common_list_objects_query_params(
            &mut query_params,
            self.delimiter,
            self.disable_url_encoding,
            self.max_keys,
            self.prefix,
        );
        if let Some(v) = self.continuation_token {
            query_params.add("continuation-token", v);
        }
        if self.fetch_owner {
            query_params.add("fetch-owner", "true");
        }
        if let Some(v) = self.start_after {
            query_params.add("start-after", v);
        }

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

impl From<ListObjects> for ListObjectsV2 {
    fn from(value: ListObjects) -> Self {
        ListObjectsV2 {
            client: value.client,
            extra_headers: value.extra_headers,
            extra_query_params: value.extra_query_params,
            region: value.region,
            bucket: value.bucket,
            delimiter: delim_helper(value.delimiter, value.recursive),
            disable_url_encoding: value.disable_url_encoding,
            max_keys: value.max_keys,
            prefix: value.prefix,
            start_after: value.start_after,
            continuation_token: value.continuation_token,
            fetch_owner: value.fetch_owner,
        }
    }
}

// endregion: list-objects-v2

// region: list-objects

/// Argument builder for listing objects. Use the `ToStream` instance to
/// consume the results; pagination is performed automatically and an error
/// terminates the stream.
#[derive(Clone)]
pub struct ListObjects {
    client: Client,

    // Parameters common to both ListObjects APIs.
    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    delimiter: Option<String>,
    disable_url_encoding: bool,
    max_keys: Option<u16>,
    prefix: Option<String>,

    // Options specific to ListObjects version 1.
    marker: Option<String>,

    // Options specific to ListObjectsV2.
    start_after: Option<String>,
    continuation_token: Option<String>,
    fetch_owner: bool,

    // Higher level options.
    recursive: bool,
    use_api_v1: bool,
}

#[async_trait]
impl ToStream for ListObjects {
    type Item = ListObjectsResponse;

    async fn to_stream(self) -> Box<dyn Stream<Item = Result<Self::Item, Error>> + Unpin + Send> {
        if self.use_api_v1 {
            let stream = ListObjectsV1::from(self).to_stream().await;
            Box::new(stream.map(|v| v.map(|v| v.into())))
        } else {
            let stream = ListObjectsV2::from(self).to_stream().await;
            Box::new(stream.map(|v| v.map(|v| v.into())))
        }
    }
}

impl ListObjects {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            delimiter: None,
            disable_url_encoding: false,
            max_keys: None,
            prefix: None,
            marker: None,
            start_after: None,
            continuation_token: None,
            fetch_owner: false,
            recursive: false,
            use_api_v1: false,
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

    /// Delimiter to roll up common prefixes on.
    pub fn delimiter(mut self, delimiter: Option<String>) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Disable setting the `EncodingType` parameter in the request. By
    /// default it is set to `url`.
    pub fn disable_url_encoding(mut self, disable_url_encoding: bool) -> Self {
        self.disable_url_encoding = disable_url_encoding;
        self
    }

    pub fn max_keys(mut self, max_keys: Option<u16>) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Used only with ListObjects version 1.
    pub fn marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }

    /// Used only with ListObjectsV2.
    pub fn start_after(mut self, start_after: Option<String>) -> Self {
        self.start_after = start_after;
        self
    }

    /// Used only with ListObjectsV2.
    pub fn continuation_token(mut self, continuation_token: Option<String>) -> Self {
        self.continuation_token = continuation_token;
        self
    }

    /// Used only with ListObjectsV2.
    pub fn fetch_owner(mut self, fetch_owner: bool) -> Self {
        self.fetch_owner = fetch_owner;
        self
    }

    /// Takes effect only when no delimiter is given: enables recursive
    /// traversal of the bucket and prefix.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Use the legacy ListObjects version 1 API. Defaults to false.
    pub fn use_api_v1(mut self, use_api_v1: bool) -> Self {
        self.use_api_v1 = use_api_v1;
        self
    }
}

// endregion: list-objects
