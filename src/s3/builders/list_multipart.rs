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

//! Argument builders for listing in-progress multipart uploads and their
//! parts.

use async_trait::async_trait;
use futures_util::{Stream, stream as futures_stream};
use http::Method;

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{ListMultipartUploadsResponse, ListPartsResponse};
use crate::s3::types::{S3Api, S3Request, ToS3Request, ToStream};
use crate::s3::utils::{check_bucket_name, check_object_name, insert};

/// Argument builder for the ListMultipartUploads S3 API.
///
/// Consumed as a stream of pages; continuation is driven by the
/// key-marker/upload-id-marker pair.
#[derive(Clone)]
pub struct ListMultipartUploads {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    delimiter: Option<String>,
    prefix: Option<String>,
    key_marker: Option<String>,
    upload_id_marker: Option<String>,
    max_uploads: Option<u16>,
    include_part_sizes: bool,
}

impl ListMultipartUploads {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            delimiter: None,
            prefix: None,
            key_marker: None,
            upload_id_marker: None,
            max_uploads: None,
            include_part_sizes: false,
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

    pub fn delimiter(mut self, delimiter: Option<String>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn key_marker(mut self, key_marker: Option<String>) -> Self {
        self.key_marker = key_marker;
        self
    }

    pub fn upload_id_marker(mut self, upload_id_marker: Option<String>) -> Self {
        self.upload_id_marker = upload_id_marker;
        self
    }

    pub fn max_uploads(mut self, max_uploads: Option<u16>) -> Self {
        self.max_uploads = max_uploads;
        self
    }

    /// Enumerate each upload's parts and surface the summed size on the
    /// upload record. Costs one ListParts listing per upload.
    pub fn include_part_sizes(mut self, include_part_sizes: bool) -> Self {
        self.include_part_sizes = include_part_sizes;
        self
    }
}

impl S3Api for ListMultipartUploads {
    type S3Response = ListMultipartUploadsResponse;
}

impl ToS3Request for ListMultipartUploads {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        let mut query_params = insert(self.extra_query_params, "uploads");
        if let Some(v) = self.delimiter {
            query_params.add("delimiter", v);
        }
        if let Some(v) = self.prefix {
            query_params.add("prefix", v);
        }
        if let Some(v) = self.key_marker {
            query_params.add("key-marker", v);
        }
        if let Some(v) = self.upload_id_marker {
            query_params.add("upload-id-marker", v);
        }
        if let Some(v) = self.max_uploads {
            query_params.add("max-uploads", v.to_string());
        }

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

#[async_trait]
impl ToStream for ListMultipartUploads {
    type Item = ListMultipartUploadsResponse;

    async fn to_stream(self) -> Box<dyn Stream<Item = Result<Self::Item, Error>> + Unpin + Send> {
        Box::new(Box::pin(futures_stream::unfold(
            (self, false),
            move |(args, is_done)| async move {
                if is_done {
                    return None;
                }
                let mut args_for_next_request = args.clone();
                let include_part_sizes = args.include_part_sizes;
                let client = args.client.clone();
                let bucket = args.bucket.clone();
                let region = args.region.clone();

                match args.send().await {
                    Ok(mut resp) => {
                        if include_part_sizes {
                            for upload in resp.uploads.iter_mut() {
                                match aggregate_part_size(
                                    &client,
                                    &bucket,
                                    region.clone(),
                                    &upload.key,
                                    &upload.upload_id,
                                )
                                .await
                                {
                                    Ok(size) => upload.aggregated_part_size = Some(size),
                                    Err(e) => {
                                        return Some((Err(e), (args_for_next_request, true)));
                                    }
                                }
                            }
                        }

                        args_for_next_request
                            .key_marker
                            .clone_from(&resp.next_key_marker);
                        args_for_next_request
                            .upload_id_marker
                            .clone_from(&resp.next_upload_id_marker);
                        let is_done = !resp.is_truncated;
                        Some((Ok(resp), (args_for_next_request, is_done)))
                    }
                    Err(e) => Some((Err(e), (args_for_next_request, true))),
                }
            },
        )))
    }
}

/// Sums the part sizes of one upload by walking its part listing.
async fn aggregate_part_size(
    client: &Client,
    bucket: &str,
    region: Option<String>,
    object: &str,
    upload_id: &str,
) -> Result<u64, Error> {
    let mut total = 0_u64;
    let mut marker: Option<u16> = None;

    loop {
        let resp = ListParts::new(client.clone(), bucket, object, upload_id)
            .region(region.clone())
            .part_number_marker(marker)
            .send()
            .await?;

        total += resp.parts.iter().map(|p| p.size).sum::<u64>();

        if !resp.is_truncated {
            return Ok(total);
        }
        marker = resp.next_part_number_marker;
    }
}

/// Argument builder for the ListParts S3 API
#[derive(Clone)]
pub struct ListParts {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    upload_id: String,
    part_number_marker: Option<u16>,
    max_parts: Option<u16>,
}

impl ListParts {
    pub fn new(client: Client, bucket: &str, object: &str, upload_id: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            upload_id: upload_id.to_string(),
            part_number_marker: None,
            max_parts: None,
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

    pub fn part_number_marker(mut self, part_number_marker: Option<u16>) -> Self {
        self.part_number_marker = part_number_marker;
        self
    }

    pub fn max_parts(mut self, max_parts: Option<u16>) -> Self {
        self.max_parts = max_parts;
        self
    }
}

impl S3Api for ListParts {
    type S3Response = ListPartsResponse;
}

impl ToS3Request for ListParts {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.upload_id.is_empty() {
            return Err(Error::argument("upload ID cannot be empty"));
        }

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("uploadId", self.upload_id);
        if let Some(v) = self.part_number_marker {
            query_params.add("part-number-marker", v.to_string());
        }
        if let Some(v) = self.max_parts {
            query_params.add("max-parts", v.to_string());
        }

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

#[async_trait]
impl ToStream for ListParts {
    type Item = ListPartsResponse;

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
                        args_for_next_request.part_number_marker = resp.next_part_number_marker;
                        let is_done = !resp.is_truncated;
                        Some((Ok(resp), (args_for_next_request, is_done)))
                    }
                    Err(e) => Some((Err(e), (args_for_next_request, true))),
                }
            },
        )))
    }
}
