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

//! Argument builders for the object upload APIs: the low-level multipart
//! protocol (create, upload part, complete, abort) and the
//! [`PutObjectContent`] driver that turns arbitrary payloads into correctly
//! sized, atomically committed uploads.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::BytesMut;
use http::Method;

use crate::s3::client::{Client, MAX_MULTIPART_COUNT, MAX_OBJECT_SIZE, MAX_PART_SIZE, MIN_PART_SIZE};
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::object_content::{ContentStream, ObjectContent, Size};
use crate::s3::response::{
    AbortMultipartUploadResponse, CompleteMultipartUploadResponse, CreateMultipartUploadResponse,
    PutObjectResponse, UploadPartResponse,
};
use crate::s3::segmented_bytes::SegmentedBytes;
use crate::s3::sse::Sse;
use crate::s3::types::{Body, FromS3Response, Part, Retention, S3Api, S3Request, ToS3Request};
use crate::s3::utils::{
    check_bucket_name, check_object_name, md5sum_hash, merge, normalize_user_headers,
    to_iso8601utc, url_encode,
};

/// Argument builder for the CreateMultipartUpload S3 API
pub struct CreateMultipartUpload {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
}

impl CreateMultipartUpload {
    pub fn new(client: Client, bucket: &str, object: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
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

impl S3Api for CreateMultipartUpload {
    type S3Response = CreateMultipartUploadResponse;
}

impl ToS3Request for CreateMultipartUpload {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        let mut headers = self.extra_headers.unwrap_or_default();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.add(CONTENT_TYPE, "application/octet-stream");
        }

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("uploads", "");

        Ok(S3Request::new(self.client, Method::POST)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers))
    }
}

/// Argument builder for the AbortMultipartUpload S3 API
pub struct AbortMultipartUpload {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    upload_id: String,
}

impl AbortMultipartUpload {
    pub fn new(client: Client, bucket: &str, object: &str, upload_id: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            upload_id: upload_id.to_string(),
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

impl S3Api for AbortMultipartUpload {
    type S3Response = AbortMultipartUploadResponse;
}

impl ToS3Request for AbortMultipartUpload {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.upload_id.is_empty() {
            return Err(Error::argument("upload ID cannot be empty"));
        }

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("uploadId", url_encode(&self.upload_id).to_string());

        Ok(S3Request::new(self.client, Method::DELETE)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}

/// Argument builder for the CompleteMultipartUpload S3 API
pub struct CompleteMultipartUpload {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    upload_id: String,
    parts: Vec<Part>,
}

impl CompleteMultipartUpload {
    pub fn new(client: Client, bucket: &str, object: &str, upload_id: &str, parts: Vec<Part>) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            upload_id: upload_id.to_string(),
            parts,
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

impl S3Api for CompleteMultipartUpload {
    type S3Response = CompleteMultipartUploadResponse;
}

impl ToS3Request for CompleteMultipartUpload {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.upload_id.is_empty() {
            return Err(Error::argument("upload ID cannot be empty"));
        }
        if self.parts.is_empty() {
            return Err(Error::argument("parts cannot be empty"));
        }

        // The service requires parts in ascending part-number order,
        // regardless of the order they were uploaded in.
        let mut parts = self.parts;
        parts.sort_by_key(|p| p.number);

        let mut data = BytesMut::with_capacity(100 * parts.len() + 100);
        data.extend_from_slice(b"<CompleteMultipartUpload>");
        for part in parts.iter() {
            data.extend_from_slice(b"<Part><PartNumber>");
            data.extend_from_slice(part.number.to_string().as_bytes());
            data.extend_from_slice(b"</PartNumber><ETag>");
            data.extend_from_slice(part.etag.as_bytes());
            data.extend_from_slice(b"</ETag></Part>");
        }
        data.extend_from_slice(b"</CompleteMultipartUpload>");
        let data = data.freeze();

        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");
        headers.add(CONTENT_MD5, md5sum_hash(data.as_ref()));

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("uploadId", self.upload_id);

        Ok(S3Request::new(self.client, Method::POST)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers)
            .body(Some(data.into())))
    }
}

/// Argument builder for the UploadPart S3 API. Also reused by the plain
/// PutObject API, which differs only by the absent upload id and part
/// number.
pub struct UploadPart {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    user_metadata: Option<Multimap>,
    sse: Option<Arc<dyn Sse>>,
    tags: Option<HashMap<String, String>>,
    retention: Option<Retention>,
    legal_hold: bool,
    content_type: Option<String>,
    data: SegmentedBytes,

    upload_id: Option<String>,
    part_number: Option<u16>,
}

impl UploadPart {
    pub fn new(
        client: Client,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: SegmentedBytes,
    ) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            user_metadata: None,
            sse: None,
            tags: None,
            retention: None,
            legal_hold: false,
            content_type: None,
            data,
            upload_id: Some(upload_id.to_string()),
            part_number: Some(part_number),
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

    pub fn user_metadata(mut self, user_metadata: Option<Multimap>) -> Self {
        self.user_metadata = user_metadata;
        self
    }

    pub fn sse(mut self, sse: Option<Arc<dyn Sse>>) -> Self {
        self.sse = sse;
        self
    }

    pub fn tags(mut self, tags: Option<HashMap<String, String>>) -> Self {
        self.tags = tags;
        self
    }

    pub fn retention(mut self, retention: Option<Retention>) -> Self {
        self.retention = retention;
        self
    }

    pub fn legal_hold(mut self, legal_hold: bool) -> Self {
        self.legal_hold = legal_hold;
        self
    }

    pub fn content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        if let Some(upload_id) = &self.upload_id {
            if upload_id.is_empty() {
                return Err(Error::argument("upload ID cannot be empty"));
            }
        }

        if let Some(part_number) = self.part_number {
            if !(1..=MAX_MULTIPART_COUNT).contains(&part_number) {
                return Err(Error::argument(format!(
                    "part number must be between 1 and {MAX_MULTIPART_COUNT}"
                )));
            }
        }

        if let Some(v) = &self.sse {
            if v.tls_required() && !self.client.is_secure() {
                return Err(Error::argument(
                    "SSE operations must be performed over a secure connection",
                ));
            }
        }

        Ok(())
    }
}

impl S3Api for UploadPart {
    type S3Response = UploadPartResponse;
}

impl ToS3Request for UploadPart {
    fn to_s3request(self) -> Result<S3Request, Error> {
        self.validate()?;

        let headers = object_write_headers(
            self.extra_headers,
            self.user_metadata,
            self.sse,
            self.tags,
            self.retention,
            self.legal_hold,
            self.content_type,
        );

        let mut query_params = self.extra_query_params.unwrap_or_default();
        if let Some(upload_id) = self.upload_id {
            query_params.add("uploadId", upload_id);
        }
        if let Some(part_number) = self.part_number {
            query_params.add("partNumber", part_number.to_string());
        }

        // Part payloads travel as streams so plain-HTTP uploads take the
        // chunk-signed path.
        let len = self.data.len() as u64;
        let body = Body::Stream(ContentStream::from(self.data), len);

        Ok(S3Request::new(self.client, Method::PUT)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers)
            .body(Some(body)))
    }
}

/// Argument builder for the plain PutObject S3 API. This is a lower-level
/// API; see [`PutObjectContent`] for the size-aware driver.
pub struct PutObject(UploadPart);

impl PutObject {
    pub fn new(client: Client, bucket: &str, object: &str, data: SegmentedBytes) -> Self {
        let mut inner = UploadPart::new(client, bucket, object, "", 1, data);
        inner.upload_id = None;
        inner.part_number = None;
        PutObject(inner)
    }

    pub fn extra_headers(mut self, extra_headers: Option<Multimap>) -> Self {
        self.0.extra_headers = extra_headers;
        self
    }

    pub fn extra_query_params(mut self, extra_query_params: Option<Multimap>) -> Self {
        self.0.extra_query_params = extra_query_params;
        self
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.0.region = region;
        self
    }

    pub fn user_metadata(mut self, user_metadata: Option<Multimap>) -> Self {
        self.0.user_metadata = user_metadata;
        self
    }

    pub fn sse(mut self, sse: Option<Arc<dyn Sse>>) -> Self {
        self.0.sse = sse;
        self
    }

    pub fn tags(mut self, tags: Option<HashMap<String, String>>) -> Self {
        self.0.tags = tags;
        self
    }

    pub fn retention(mut self, retention: Option<Retention>) -> Self {
        self.0.retention = retention;
        self
    }

    pub fn legal_hold(mut self, legal_hold: bool) -> Self {
        self.0.legal_hold = legal_hold;
        self
    }

    pub fn content_type(mut self, content_type: Option<String>) -> Self {
        self.0.content_type = content_type;
        self
    }
}

impl S3Api for PutObject {
    type S3Response = PutObjectResponse;
}

impl ToS3Request for PutObject {
    fn to_s3request(self) -> Result<S3Request, Error> {
        self.0.to_s3request()
    }
}

fn object_write_headers(
    extra_headers: Option<Multimap>,
    user_metadata: Option<Multimap>,
    sse: Option<Arc<dyn Sse>>,
    tags: Option<HashMap<String, String>>,
    retention: Option<Retention>,
    legal_hold: bool,
    content_type: Option<String>,
) -> Multimap {
    let mut map = extra_headers.unwrap_or_default();

    if let Some(v) = user_metadata {
        merge(&mut map, &normalize_user_headers(&v));
    }

    if let Some(v) = sse {
        merge(&mut map, &v.headers());
    }

    if let Some(v) = tags {
        let mut tagging = String::new();
        for (key, value) in v.iter() {
            if !tagging.is_empty() {
                tagging.push('&');
            }
            tagging.push_str(&url_encode(key));
            tagging.push('=');
            tagging.push_str(&url_encode(value));
        }
        if !tagging.is_empty() {
            map.add(X_AMZ_TAGGING, tagging);
        }
    }

    if let Some(v) = retention {
        map.add(X_AMZ_OBJECT_LOCK_MODE, v.mode.to_string());
        map.add(
            X_AMZ_OBJECT_LOCK_RETAIN_UNTIL_DATE,
            to_iso8601utc(v.retain_until_date),
        );
    }

    if legal_hold {
        map.add(X_AMZ_OBJECT_LOCK_LEGAL_HOLD, "ON");
    }

    if let Some(v) = content_type {
        if !map.contains_key(CONTENT_TYPE) {
            map.add(CONTENT_TYPE, v);
        }
    }

    map
}

// region: part sizing

/// Computes the part layout of a multipart upload of `object_size` bytes:
/// part size (a multiple of the minimum part size), part count, and the
/// size of the last part.
pub fn calc_multipart_size(object_size: u64) -> (u64, u16, u64) {
    let mut part_size = object_size.div_ceil(MAX_MULTIPART_COUNT as u64);
    part_size = part_size.div_ceil(MIN_PART_SIZE) * MIN_PART_SIZE;
    if part_size == 0 {
        part_size = MIN_PART_SIZE;
    }

    let part_count = object_size.div_ceil(part_size).max(1) as u16;
    let mut last_part_size = part_size - (part_size * part_count as u64 - object_size);
    if last_part_size == 0 {
        last_part_size = part_size;
    }

    (part_size, part_count, last_part_size)
}

/// Returns the part size and, when the object size is known, the part
/// count. Payloads up to the maximum part size go up in a single PUT.
pub(crate) fn calc_part_info(
    object_size: Size,
    part_size: Option<u64>,
) -> Result<(u64, Option<u16>), Error> {
    if let Some(v) = part_size {
        if v < MIN_PART_SIZE {
            return Err(Error::argument(format!(
                "part size {v} is not supported; minimum allowed 5MiB"
            )));
        }
        if v > MAX_PART_SIZE {
            return Err(Error::argument(format!(
                "part size {v} is not supported; maximum allowed 5GiB"
            )));
        }
    }

    match (object_size.value(), part_size) {
        (Some(object_size), _) if object_size > MAX_OBJECT_SIZE => Err(Error::argument(format!(
            "object size {object_size} is not supported; maximum allowed 5TiB"
        ))),
        (Some(object_size), Some(part_size)) => {
            let part_count = object_size.div_ceil(part_size).max(1);
            if part_count > MAX_MULTIPART_COUNT as u64 {
                return Err(Error::argument(format!(
                    "object size {object_size} and part size {part_size} make more than {MAX_MULTIPART_COUNT} parts for upload"
                )));
            }
            Ok((part_size, Some(part_count as u16)))
        }
        (Some(object_size), None) => {
            if object_size <= MAX_PART_SIZE {
                // Below the single-put threshold there is no multipart
                // upload at all.
                return Ok((object_size, Some(1)));
            }
            let (part_size, part_count, _) = calc_multipart_size(object_size);
            Ok((part_size, Some(part_count)))
        }
        (None, Some(part_size)) => Ok((part_size, None)),
        (None, None) => {
            // Unknown-size streams are laid out for the worst case, the
            // maximum object size.
            let (part_size, _, _) = calc_multipart_size(MAX_OBJECT_SIZE);
            Ok((part_size, None))
        }
    }
}

// endregion: part sizing

/// Uploads [`ObjectContent`] to a bucket, driving the multipart protocol
/// transparently.
///
/// Payloads of known size up to 5 GiB go up as one PUT. Larger payloads are
/// partitioned by [`calc_multipart_size`]; unknown-size streams are probed
/// one part ahead, reverting to a single PUT when the first probe drains
/// the stream. Any failure aborts the multipart upload before the error is
/// returned.
pub struct PutObjectContent {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    user_metadata: Option<Multimap>,
    sse: Option<Arc<dyn Sse>>,
    tags: Option<HashMap<String, String>>,
    retention: Option<Retention>,
    legal_hold: bool,
    part_size: Option<u64>,
    content_type: String,

    input_content: ObjectContent,

    // Filled by send().
    reader: ContentStream,
}

impl PutObjectContent {
    pub fn new(client: Client, bucket: &str, object: &str, content: impl Into<ObjectContent>) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            user_metadata: None,
            sse: None,
            tags: None,
            retention: None,
            legal_hold: false,
            part_size: None,
            content_type: String::from("application/octet-stream"),
            input_content: content.into(),
            reader: ContentStream::empty(),
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

    pub fn user_metadata(mut self, user_metadata: Option<Multimap>) -> Self {
        self.user_metadata = user_metadata;
        self
    }

    pub fn sse(mut self, sse: Option<Arc<dyn Sse>>) -> Self {
        self.sse = sse;
        self
    }

    pub fn tags(mut self, tags: Option<HashMap<String, String>>) -> Self {
        self.tags = tags;
        self
    }

    pub fn retention(mut self, retention: Option<Retention>) -> Self {
        self.retention = retention;
        self
    }

    pub fn legal_hold(mut self, legal_hold: bool) -> Self {
        self.legal_hold = legal_hold;
        self
    }

    /// Override the computed part size. Must be between 5 MiB and 5 GiB.
    pub fn part_size(mut self, part_size: Option<u64>) -> Self {
        self.part_size = part_size;
        self
    }

    pub fn content_type(mut self, content_type: String) -> Self {
        self.content_type = content_type;
        self
    }

    pub async fn send(mut self) -> Result<PutObjectResponse, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        if let Some(v) = &self.sse {
            if v.tls_required() && !self.client.is_secure() {
                return Err(Error::argument(
                    "SSE operations must be performed over a secure connection",
                ));
            }
        }

        let content = std::mem::take(&mut self.input_content);
        self.reader = content.into_content_stream().await?;

        let object_size = self.reader.get_size();
        let (part_size, expected_parts) = calc_part_info(object_size, self.part_size)?;

        match expected_parts {
            // Known size within the single-put threshold: stream the whole
            // payload in one request.
            Some(1) => {
                let size = object_size.value().expect("size is known for one part");
                let reader = std::mem::replace(&mut self.reader, ContentStream::empty());
                self.send_single_stream(reader, size).await
            }
            Some(part_count) => {
                let upload_id = self.create_upload().await?;
                let res = self.send_known_parts(part_size, part_count, &upload_id).await;
                self.abort_on_failure(res, &upload_id).await
            }
            None => {
                // Probe one byte past the part size; a short first probe
                // means the payload fits a single PUT after all.
                let first = self.reader.read_upto(part_size as usize + 1).await?;
                if first.len() as u64 <= part_size {
                    return self.send_single_buffered(first).await;
                }

                let upload_id = self.create_upload().await?;
                let res = self.send_unknown_parts(part_size, first, &upload_id).await;
                self.abort_on_failure(res, &upload_id).await
            }
        }
    }

    async fn create_upload(&self) -> Result<String, Error> {
        let headers = object_write_headers(
            self.extra_headers.clone(),
            self.user_metadata.clone(),
            self.sse.clone(),
            self.tags.clone(),
            self.retention.clone(),
            self.legal_hold,
            Some(self.content_type.clone()),
        );

        let resp = CreateMultipartUpload::new(self.client.clone(), &self.bucket, &self.object)
            .extra_headers(Some(headers))
            .extra_query_params(self.extra_query_params.clone())
            .region(self.region.clone())
            .send()
            .await?;

        Ok(resp.upload_id)
    }

    async fn abort_on_failure(
        &self,
        res: Result<PutObjectResponse, Error>,
        upload_id: &str,
    ) -> Result<PutObjectResponse, Error> {
        if res.is_err() {
            // Best effort; the original error is what propagates.
            if let Err(abort_err) =
                AbortMultipartUpload::new(self.client.clone(), &self.bucket, &self.object, upload_id)
                    .region(self.region.clone())
                    .send()
                    .await
            {
                log::warn!(
                    "failed to abort multipart upload {upload_id} of {}/{}: {abort_err}",
                    self.bucket,
                    self.object
                );
            }
        }
        res
    }

    async fn send_known_parts(
        &mut self,
        part_size: u64,
        part_count: u16,
        upload_id: &str,
    ) -> Result<PutObjectResponse, Error> {
        let mut parts: Vec<Part> = Vec::with_capacity(part_count as usize);

        for part_number in 1..=part_count {
            let chunk = self.reader.read_upto(part_size as usize).await?;
            if chunk.is_empty() && part_number > 1 {
                return Err(Error::argument(format!(
                    "stream ended after {} parts, expected {part_count}",
                    part_number - 1
                )));
            }

            let resp = self
                .to_upload_part(chunk, upload_id, part_number)
                .send()
                .await?;
            parts.push(Part {
                number: part_number,
                etag: resp.etag,
            });
        }

        self.complete_upload(upload_id, parts).await
    }

    async fn send_unknown_parts(
        &mut self,
        part_size: u64,
        first: SegmentedBytes,
        upload_id: &str,
    ) -> Result<PutObjectResponse, Error> {
        let mut parts: Vec<Part> = Vec::new();
        let mut pending = first;
        let mut part_number: u16 = 0;

        loop {
            // `pending` holds up to part_size + 1 bytes; a full probe means
            // more parts follow.
            let last = pending.len() as u64 <= part_size;
            let rest = (!last).then(|| pending.split_off(part_size as usize));

            if part_number == MAX_MULTIPART_COUNT {
                return Err(Error::argument("too many parts for upload"));
            }
            part_number += 1;

            let resp = self
                .to_upload_part(pending, upload_id, part_number)
                .send()
                .await?;
            parts.push(Part {
                number: part_number,
                etag: resp.etag,
            });

            if last {
                break;
            }

            pending = rest.expect("rest exists for a non-final part");
            let more = self
                .reader
                .read_upto(part_size as usize + 1 - pending.len())
                .await?;
            for b in more {
                pending.append(b);
            }
        }

        self.complete_upload(upload_id, parts).await
    }

    async fn complete_upload(
        &self,
        upload_id: &str,
        parts: Vec<Part>,
    ) -> Result<PutObjectResponse, Error> {
        let resp = CompleteMultipartUpload::new(
            self.client.clone(),
            &self.bucket,
            &self.object,
            upload_id,
            parts,
        )
        .region(self.region.clone())
        .send()
        .await?;

        Ok(PutObjectResponse {
            headers: resp.headers,
            bucket: resp.bucket,
            object: resp.object,
            region: resp.region,
            etag: resp.etag,
            version_id: resp.version_id,
        })
    }

    fn to_upload_part(&self, data: SegmentedBytes, upload_id: &str, part_number: u16) -> UploadPart {
        UploadPart::new(
            self.client.clone(),
            &self.bucket,
            &self.object,
            upload_id,
            part_number,
            data,
        )
        .region(self.region.clone())
        .sse(self.sse.clone())
        .content_type(Some(self.content_type.clone()))
    }

    async fn send_single_buffered(&self, data: SegmentedBytes) -> Result<PutObjectResponse, Error> {
        PutObject::new(self.client.clone(), &self.bucket, &self.object, data)
            .extra_headers(self.extra_headers.clone())
            .extra_query_params(self.extra_query_params.clone())
            .region(self.region.clone())
            .user_metadata(self.user_metadata.clone())
            .sse(self.sse.clone())
            .tags(self.tags.clone())
            .retention(self.retention.clone())
            .legal_hold(self.legal_hold)
            .content_type(Some(self.content_type.clone()))
            .send()
            .await
    }

    async fn send_single_stream(
        &self,
        reader: ContentStream,
        size: u64,
    ) -> Result<PutObjectResponse, Error> {
        let headers = object_write_headers(
            self.extra_headers.clone(),
            self.user_metadata.clone(),
            self.sse.clone(),
            self.tags.clone(),
            self.retention.clone(),
            self.legal_hold,
            Some(self.content_type.clone()),
        );

        let mut req = S3Request::new(self.client.clone(), Method::PUT)
            .region(self.region.clone())
            .bucket(Some(self.bucket.clone()))
            .object(Some(self.object.clone()))
            .query_params(self.extra_query_params.clone().unwrap_or_default())
            .headers(headers)
            .body(Some(Body::Stream(reader, size)));

        let resp = req.execute().await;
        PutObjectResponse::from_s3response(req, resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn multipart_size_of_ten_gib() {
        let (part_size, part_count, last) = calc_multipart_size(10 * 1024 * MIB);
        assert_eq!(part_size, 5 * MIB);
        assert_eq!(part_count, 2048);
        assert_eq!(last, 5 * MIB);
    }

    #[test]
    fn multipart_size_of_max_object() {
        let (part_size, part_count, last) = calc_multipart_size(MAX_OBJECT_SIZE);
        assert_eq!(part_size % MIN_PART_SIZE, 0);
        assert!(part_count <= MAX_MULTIPART_COUNT);
        assert_eq!(
            (part_count as u64 - 1) * part_size + last,
            MAX_OBJECT_SIZE
        );
    }

    quickcheck! {
        fn multipart_size_laws(object_size: u64) -> bool {
            let object_size = object_size % MAX_OBJECT_SIZE;
            let (part_size, part_count, last) = calc_multipart_size(object_size);

            part_size % MIN_PART_SIZE == 0
                && part_count <= MAX_MULTIPART_COUNT
                && last <= part_size
                && (part_count as u64 - 1) * part_size + last == object_size
                || object_size == 0 && part_count == 1
        }
    }

    #[test]
    fn part_info_small_known_size_is_single_put() {
        let (part_size, count) = calc_part_info(Size::Known(100 * MIB), None).unwrap();
        assert_eq!(part_size, 100 * MIB);
        assert_eq!(count, Some(1));
    }

    #[test]
    fn part_info_large_known_size_is_multipart() {
        let (part_size, count) = calc_part_info(Size::Known(10 * 1024 * MIB), None).unwrap();
        assert_eq!(part_size, 5 * MIB);
        assert_eq!(count, Some(2048));
    }

    #[test]
    fn part_info_unknown_size_uses_worst_case_layout() {
        let (part_size, count) = calc_part_info(Size::Unknown, None).unwrap();
        assert_eq!(part_size, 550_502_400);
        assert_eq!(count, None);
    }

    #[test]
    fn part_info_rejects_oversized_objects() {
        assert!(calc_part_info(Size::Known(MAX_OBJECT_SIZE + 1), None).is_err());
        assert!(calc_part_info(Size::Known(MIB), Some(MIB)).is_err());
        assert!(calc_part_info(Size::Unknown, Some(6 * 1024 * MIB)).is_err());
    }
}
