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

//! Argument builders for server-side copy: plain object copy, upload-part
//! copy, and the compose orchestrator that stitches source byte ranges into
//! a destination object without moving data through the client.

use crate::s3::client::{Client, MAX_MULTIPART_COUNT, MAX_OBJECT_SIZE, MAX_PART_SIZE, MIN_PART_SIZE};
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::{
    ComposeObjectResponse, CopyObjectResponse, CreateMultipartUploadResponse, StatObjectResponse,
    UploadPartCopyResponse,
};
use crate::s3::sse::{Sse, SseCustomerKey};
use crate::s3::types::{Directive, PartInfo, Retention, S3Api, S3Request, ToS3Request};
use crate::s3::utils::{
    UtcTime, check_bucket_name, check_object_name, merge, normalize_user_headers,
    to_http_header_value, to_iso8601utc, url_encode,
};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Argument builder for the UploadPartCopy S3 API
pub struct UploadPartCopy {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    object: String,
    upload_id: String,
    part_number: u16,
    headers: Multimap,
}

impl UploadPartCopy {
    pub fn new(client: Client, bucket: &str, object: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            object: object.to_string(),
            upload_id: String::new(),
            part_number: 0,
            headers: Multimap::new(),
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

    pub fn upload_id(mut self, upload_id: String) -> Self {
        self.upload_id = upload_id;
        self
    }

    pub fn part_number(mut self, part_number: u16) -> Self {
        self.part_number = part_number;
        self
    }

    /// Copy-source and range headers of this part.
    pub fn headers(mut self, headers: Multimap) -> Self {
        self.headers = headers;
        self
    }
}

impl S3Api for UploadPartCopy {
    type S3Response = UploadPartCopyResponse;
}

impl ToS3Request for UploadPartCopy {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.upload_id.is_empty() {
            return Err(Error::argument("upload ID cannot be empty"));
        }
        if !(1..=MAX_MULTIPART_COUNT).contains(&self.part_number) {
            return Err(Error::argument(format!(
                "part number must be between 1 and {MAX_MULTIPART_COUNT}"
            )));
        }

        let mut headers = self.extra_headers.unwrap_or_default();
        merge(&mut headers, &self.headers);

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("partNumber", self.part_number.to_string());
        query_params.add("uploadId", self.upload_id);

        Ok(S3Request::new(self.client, Method::PUT)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(query_params)
            .headers(headers))
    }
}

/// Source object of a copy, optionally restricted to a byte range and
/// guarded by conditional headers.
#[derive(Clone, Debug, Default)]
pub struct CopySource {
    pub extra_headers: Option<Multimap>,
    pub extra_query_params: Option<Multimap>,
    pub region: Option<String>,
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub ssec: Option<SseCustomerKey>,
    pub offset: Option<u64>,
    pub length: Option<u64>,
    pub match_etag: Option<String>,
    pub not_match_etag: Option<String>,
    pub modified_since: Option<UtcTime>,
    pub unmodified_since: Option<UtcTime>,
}

impl CopySource {
    pub fn new(bucket_name: &str, object_name: &str) -> Result<CopySource, Error> {
        check_bucket_name(bucket_name)?;
        check_object_name(object_name)?;

        Ok(CopySource {
            bucket: bucket_name.to_owned(),
            object: object_name.to_owned(),
            ..Default::default()
        })
    }

    fn copy_source_value(&self) -> String {
        let mut copy_source = String::from("/");
        copy_source.push_str(&self.bucket);
        copy_source.push('/');
        copy_source.push_str(&self.object);
        if let Some(v) = &self.version_id {
            copy_source.push_str("?versionId=");
            copy_source.push_str(&url_encode(v));
        }
        copy_source
    }

    fn range_value(&self) -> String {
        let (offset, length) = match self.length {
            Some(_) => (Some(self.offset.unwrap_or(0)), self.length),
            None => (self.offset, None),
        };

        let mut range = String::new();
        if let Some(o) = offset {
            range.push_str("bytes=");
            range.push_str(&o.to_string());
            range.push('-');
            if let Some(l) = length {
                range.push_str(&(o + l - 1).to_string());
            }
        }
        range
    }

    fn headers(&self) -> Multimap {
        let mut headers = Multimap::new();
        headers.add(X_AMZ_COPY_SOURCE, self.copy_source_value());

        let range = self.range_value();
        if !range.is_empty() {
            headers.add(X_AMZ_COPY_SOURCE_RANGE, range);
        }
        if let Some(v) = &self.match_etag {
            headers.add(X_AMZ_COPY_SOURCE_IF_MATCH, v.clone());
        }
        if let Some(v) = &self.not_match_etag {
            headers.add(X_AMZ_COPY_SOURCE_IF_NONE_MATCH, v.clone());
        }
        if let Some(v) = self.modified_since {
            headers.add(X_AMZ_COPY_SOURCE_IF_MODIFIED_SINCE, to_http_header_value(v));
        }
        if let Some(v) = self.unmodified_since {
            headers.add(
                X_AMZ_COPY_SOURCE_IF_UNMODIFIED_SINCE,
                to_http_header_value(v),
            );
        }
        if let Some(v) = &self.ssec {
            merge(&mut headers, &v.copy_headers());
        }
        headers
    }
}

/// Source of a compose operation. Size and ETag are resolved by a HEAD on
/// the source before any copy starts.
#[derive(Clone, Debug, Default)]
pub struct ComposeSource {
    pub extra_headers: Option<Multimap>,
    pub extra_query_params: Option<Multimap>,
    pub region: Option<String>,
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub ssec: Option<SseCustomerKey>,
    pub offset: Option<u64>,
    pub length: Option<u64>,
    pub match_etag: Option<String>,
    pub not_match_etag: Option<String>,
    pub modified_since: Option<UtcTime>,
    pub unmodified_since: Option<UtcTime>,

    object_size: Option<u64>,  // populated by build_headers()
    headers: Option<Multimap>, // populated by build_headers()
}

impl ComposeSource {
    pub fn new(bucket_name: &str, object_name: &str) -> Result<ComposeSource, Error> {
        check_bucket_name(bucket_name)?;
        check_object_name(object_name)?;

        Ok(ComposeSource {
            bucket: bucket_name.to_owned(),
            object: object_name.to_owned(),
            ..Default::default()
        })
    }

    pub fn get_object_size(&self) -> u64 {
        self.object_size
            .expect("ComposeSource::build_headers() must be called before get_object_size()")
    }

    pub fn get_headers(&self) -> Multimap {
        self.headers
            .as_ref()
            .expect("ComposeSource::build_headers() must be called before get_headers()")
            .clone()
    }

    pub fn build_headers(&mut self, object_size: u64, etag: String) -> Result<(), Error> {
        if let Some(v) = self.offset {
            if v >= object_size {
                return Err(Error::argument(format!(
                    "source {}/{}: offset {} is beyond object size {}",
                    self.bucket, self.object, v, object_size
                )));
            }
        }

        if let Some(v) = self.length {
            if v > object_size {
                return Err(Error::argument(format!(
                    "source {}/{}: length {} is beyond object size {}",
                    self.bucket, self.object, v, object_size
                )));
            }

            if (self.offset.unwrap_or_default() + v) > object_size {
                return Err(Error::argument(format!(
                    "source {}/{}: compose size {} is beyond object size {}",
                    self.bucket,
                    self.object,
                    self.offset.unwrap_or_default() + v,
                    object_size
                )));
            }
        }

        self.object_size = Some(object_size);

        let mut headers = Multimap::new();

        let mut copy_source = String::from("/");
        copy_source.push_str(&self.bucket);
        copy_source.push('/');
        copy_source.push_str(&self.object);
        if let Some(v) = &self.version_id {
            copy_source.push_str("?versionId=");
            copy_source.push_str(&url_encode(v));
        }
        headers.add(X_AMZ_COPY_SOURCE, copy_source);

        if let Some(v) = &self.match_etag {
            headers.add(X_AMZ_COPY_SOURCE_IF_MATCH, v.clone());
        }
        if let Some(v) = &self.not_match_etag {
            headers.add(X_AMZ_COPY_SOURCE_IF_NONE_MATCH, v.clone());
        }
        if let Some(v) = self.modified_since {
            headers.add(X_AMZ_COPY_SOURCE_IF_MODIFIED_SINCE, to_http_header_value(v));
        }
        if let Some(v) = self.unmodified_since {
            headers.add(
                X_AMZ_COPY_SOURCE_IF_UNMODIFIED_SINCE,
                to_http_header_value(v),
            );
        }
        if let Some(v) = &self.ssec {
            merge(&mut headers, &v.copy_headers());
        }

        // Pin the copy to the size/etag observed by the HEAD.
        if !headers.contains_key(X_AMZ_COPY_SOURCE_IF_MATCH) {
            headers.add(X_AMZ_COPY_SOURCE_IF_MATCH, etag);
        }

        self.headers = Some(headers);

        Ok(())
    }
}

fn copy_destination_headers(
    extra_headers: Option<Multimap>,
    user_metadata: Option<Multimap>,
    sse: Option<Arc<dyn Sse>>,
    tags: Option<HashMap<String, String>>,
    retention: Option<Retention>,
    legal_hold: bool,
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

    map
}

/// Argument builder for the CopyObject S3 API.
///
/// Sources with a byte range or larger than the maximum part size cannot be
/// copied in one call; those are routed through the compose orchestrator.
pub struct CopyObject {
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
    source: CopySource,
    metadata_directive: Option<Directive>,
    tagging_directive: Option<Directive>,
}

impl CopyObject {
    pub fn new(client: Client, bucket: &str, object: &str, source: CopySource) -> Self {
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
            source,
            metadata_directive: None,
            tagging_directive: None,
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

    pub fn metadata_directive(mut self, metadata_directive: Option<Directive>) -> Self {
        self.metadata_directive = metadata_directive;
        self
    }

    pub fn tagging_directive(mut self, tagging_directive: Option<Directive>) -> Self {
        self.tagging_directive = tagging_directive;
        self
    }

    pub async fn send(self) -> Result<CopyObjectResponse, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;

        if let Some(v) = &self.sse {
            if v.tls_required() && !self.client.is_secure() {
                return Err(Error::argument(
                    "SSE operations must be performed over a secure connection",
                ));
            }
        }
        if self.source.ssec.is_some() && !self.client.is_secure() {
            return Err(Error::argument(
                "SSE-C operations must be performed over a secure connection",
            ));
        }

        let source = self.source.clone();
        let stat: StatObjectResponse = self
            .client
            .stat_object(&source.bucket, &source.object)
            .extra_headers(source.extra_headers.clone())
            .extra_query_params(source.extra_query_params.clone())
            .region(source.region.clone())
            .version_id(source.version_id.clone())
            .ssec(source.ssec.clone())
            .match_etag(source.match_etag.clone())
            .not_match_etag(source.not_match_etag.clone())
            .modified_since(source.modified_since)
            .unmodified_since(source.unmodified_since)
            .send()
            .await?;

        if self.source.offset.is_some()
            || self.source.length.is_some()
            || stat.size > MAX_PART_SIZE
        {
            if self.metadata_directive == Some(Directive::Copy) {
                return Err(Error::argument(
                    "COPY metadata directive is not applicable to sources with a byte range or larger than 5 GiB",
                ));
            }
            if self.tagging_directive == Some(Directive::Copy) {
                return Err(Error::argument(
                    "COPY tagging directive is not applicable to sources with a byte range or larger than 5 GiB",
                ));
            }

            let mut src = ComposeSource::new(&self.source.bucket, &self.source.object)?;
            src.extra_headers = self.source.extra_headers;
            src.extra_query_params = self.source.extra_query_params;
            src.region = self.source.region;
            src.version_id = self.source.version_id;
            src.ssec = self.source.ssec;
            src.offset = self.source.offset;
            src.length = self.source.length;
            src.match_etag = self.source.match_etag;
            src.not_match_etag = self.source.not_match_etag;
            src.modified_since = self.source.modified_since;
            src.unmodified_since = self.source.unmodified_since;

            let resp: ComposeObjectResponse = ComposeObject::new(
                self.client.clone(),
                &self.bucket,
                &self.object,
                vec![src],
            )
            .extra_headers(self.extra_headers)
            .extra_query_params(self.extra_query_params)
            .region(self.region)
            .user_metadata(self.user_metadata)
            .sse(self.sse)
            .tags(self.tags)
            .retention(self.retention)
            .legal_hold(self.legal_hold)
            .send()
            .await?;

            return Ok(CopyObjectResponse {
                headers: resp.headers,
                bucket: resp.bucket,
                object: resp.object,
                region: resp.region,
                etag: resp.etag,
                version_id: resp.version_id,
            });
        }

        let mut headers = copy_destination_headers(
            self.extra_headers,
            self.user_metadata,
            self.sse,
            self.tags,
            self.retention,
            self.legal_hold,
        );
        if let Some(v) = &self.metadata_directive {
            headers.add(X_AMZ_METADATA_DIRECTIVE, v.to_string());
        }
        if let Some(v) = &self.tagging_directive {
            headers.add(X_AMZ_TAGGING_DIRECTIVE, v.to_string());
        }
        merge(&mut headers, &self.source.headers());

        let mut req = S3Request::new(self.client, Method::PUT)
            .region(self.region)
            .bucket(Some(self.bucket))
            .object(Some(self.object))
            .query_params(self.extra_query_params.unwrap_or_default())
            .headers(headers);

        let resp = req.execute().await;
        use crate::s3::types::FromS3Response;
        CopyObjectResponse::from_s3response(req, resp).await
    }
}

/// Resolves every source via HEAD, validates the batch against the part
/// limits, and returns the aggregate part count.
async fn calc_part_count(client: &Client, sources: &mut [ComposeSource]) -> Result<u16, Error> {
    let mut object_size = 0_u64;
    let mut part_count = 0_u16;
    let sources_len = sources.len();

    for (i, source) in sources.iter_mut().enumerate() {
        if i != 0 && source.ssec.is_some() {
            return Err(Error::argument(format!(
                "source {}/{}: client-supplied encryption keys are only accepted on the first source",
                source.bucket, source.object
            )));
        }

        let stat: StatObjectResponse = client
            .stat_object(&source.bucket, &source.object)
            .extra_headers(source.extra_headers.clone())
            .extra_query_params(source.extra_query_params.clone())
            .region(source.region.clone())
            .version_id(source.version_id.clone())
            .ssec(source.ssec.clone())
            .match_etag(source.match_etag.clone())
            .not_match_etag(source.not_match_etag.clone())
            .modified_since(source.modified_since)
            .unmodified_since(source.unmodified_since)
            .send()
            .await?;

        let mut size = stat.size;
        source.build_headers(size, stat.etag)?;

        if let Some(l) = source.length {
            size = l;
        } else if let Some(o) = source.offset {
            size -= o;
        }

        let is_last_source = i + 1 == sources_len;
        if size < MIN_PART_SIZE && sources_len != 1 && !is_last_source {
            return Err(Error::argument(format!(
                "source {}/{}: size {size} must be at least {MIN_PART_SIZE}",
                source.bucket, source.object
            )));
        }

        object_size += size;
        if object_size > MAX_OBJECT_SIZE {
            return Err(Error::argument(format!(
                "object size {object_size} is not supported; maximum allowed 5TiB"
            )));
        }

        if size > MAX_PART_SIZE {
            let mut count = size / MAX_PART_SIZE;
            let mut last_part_size = size - count * MAX_PART_SIZE;
            if last_part_size > 0 {
                count += 1;
            } else {
                last_part_size = MAX_PART_SIZE;
            }

            if last_part_size < MIN_PART_SIZE && sources_len != 1 && !is_last_source {
                return Err(Error::argument(format!(
                    "source {}/{}: size {size} splits into a final fragment smaller than {MIN_PART_SIZE}",
                    source.bucket, source.object
                )));
            }

            part_count += count as u16;
        } else {
            part_count += 1;
        }

        if part_count > MAX_MULTIPART_COUNT {
            return Err(Error::argument(format!(
                "compose sources create more than the allowed multipart count {MAX_MULTIPART_COUNT}"
            )));
        }
    }

    Ok(part_count)
}

/// Composes a destination object out of N source byte ranges using
/// server-side part copies.
///
/// With a single aggregate part the compose degrades to one copy request;
/// otherwise a multipart upload is driven and aborted on any failure.
pub struct ComposeObject {
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
    sources: Vec<ComposeSource>,
}

impl ComposeObject {
    pub fn new(client: Client, bucket: &str, object: &str, sources: Vec<ComposeSource>) -> Self {
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
            sources,
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

    pub async fn send(self) -> Result<ComposeObjectResponse, Error> {
        check_bucket_name(&self.bucket)?;
        check_object_name(&self.object)?;
        if self.sources.is_empty() {
            return Err(Error::argument("compose sources cannot be empty"));
        }

        if let Some(v) = &self.sse {
            if v.tls_required() && !self.client.is_secure() {
                return Err(Error::argument(
                    "SSE operations must be performed over a secure connection",
                ));
            }
        }
        for source in &self.sources {
            if source.ssec.is_some() && !self.client.is_secure() {
                return Err(Error::argument(
                    "SSE-C operations must be performed over a secure connection",
                ));
            }
        }

        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let object = self.object.clone();

        let (res, upload_id) = self.run().await;
        match res {
            Ok(v) => Ok(v),
            Err(e) => {
                if !upload_id.is_empty() {
                    // Best effort; the original error is what propagates.
                    if let Err(abort_err) = client
                        .abort_multipart_upload(&bucket, &object, &upload_id)
                        .send()
                        .await
                    {
                        log::warn!(
                            "failed to abort multipart upload {upload_id} of {bucket}/{object}: {abort_err}"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn run(self) -> (Result<ComposeObjectResponse, Error>, String) {
        let mut upload_id = String::new();

        let mut sources = self.sources;
        let part_count: u16 = match calc_part_count(&self.client, &mut sources).await {
            Ok(v) => v,
            Err(e) => return (Err(e), upload_id),
        };
        let sources = sources;

        if part_count == 1 {
            // One aggregate part degrades to a plain copy with the range
            // applied.
            let source = &sources[0];
            let mut headers = copy_destination_headers(
                self.extra_headers,
                self.user_metadata,
                self.sse,
                self.tags,
                self.retention,
                self.legal_hold,
            );
            merge(&mut headers, &source.get_headers());

            let offset = source.offset.unwrap_or_default();
            let length = source.length.or_else(|| {
                source
                    .offset
                    .map(|o| source.get_object_size() - o)
            });
            if let Some(l) = length {
                headers.add(
                    X_AMZ_COPY_SOURCE_RANGE,
                    format!("bytes={}-{}", offset, offset + l - 1),
                );
            }

            let mut req = S3Request::new(self.client, Method::PUT)
                .region(self.region)
                .bucket(Some(self.bucket))
                .object(Some(self.object))
                .query_params(self.extra_query_params.unwrap_or_default())
                .headers(headers);

            let resp = req.execute().await;
            use crate::s3::types::FromS3Response;
            let res = match ComposeObjectResponse::from_s3response(req, resp).await {
                Ok(v) => Ok(v),
                Err(e) => Err(e),
            };
            return (res, upload_id);
        }

        let headers = copy_destination_headers(
            self.extra_headers,
            self.user_metadata,
            self.sse.clone(),
            self.tags,
            self.retention,
            self.legal_hold,
        );

        let cmu: CreateMultipartUploadResponse = match self
            .client
            .create_multipart_upload(&self.bucket, &self.object)
            .extra_headers(Some(headers))
            .extra_query_params(self.extra_query_params.clone())
            .region(self.region.clone())
            .send()
            .await
        {
            Ok(v) => v,
            Err(e) => return (Err(e), upload_id),
        };
        upload_id.push_str(&cmu.upload_id);

        // Per-destination SSE-C headers also accompany every part copy.
        let ssec_headers: Multimap = match &self.sse {
            Some(v) if v.as_any().downcast_ref::<SseCustomerKey>().is_some() => v.headers(),
            _ => Multimap::new(),
        };

        let mut part_number = 0_u16;
        let mut parts: Vec<PartInfo> = Vec::new();
        for source in sources.iter() {
            let mut size = source.get_object_size();
            if let Some(l) = source.length {
                size = l;
            } else if let Some(o) = source.offset {
                size -= o;
            }

            let mut offset = source.offset.unwrap_or_default();

            let mut headers = source.get_headers();
            merge(&mut headers, &ssec_headers);

            if size <= MAX_PART_SIZE {
                part_number += 1;
                if source.length.is_some() || source.offset.is_some() {
                    headers.add(
                        X_AMZ_COPY_SOURCE_RANGE,
                        format!("bytes={}-{}", offset, offset + size - 1),
                    );
                }

                let resp: UploadPartCopyResponse = match self
                    .client
                    .upload_part_copy(&self.bucket, &self.object)
                    .region(self.region.clone())
                    .upload_id(upload_id.clone())
                    .part_number(part_number)
                    .headers(headers)
                    .send()
                    .await
                {
                    Ok(v) => v,
                    Err(e) => return (Err(e), upload_id),
                };

                parts.push(PartInfo {
                    number: part_number,
                    etag: resp.etag,
                    size,
                });
            } else {
                while size > 0 {
                    part_number += 1;

                    let length = size.min(MAX_PART_SIZE);
                    let end_bytes = offset + length - 1;

                    let mut headers_copy = headers.clone();
                    headers_copy.add(X_AMZ_COPY_SOURCE_RANGE, format!("bytes={offset}-{end_bytes}"));

                    let resp: UploadPartCopyResponse = match self
                        .client
                        .upload_part_copy(&self.bucket, &self.object)
                        .region(self.region.clone())
                        .upload_id(upload_id.clone())
                        .part_number(part_number)
                        .headers(headers_copy)
                        .send()
                        .await
                    {
                        Ok(v) => v,
                        Err(e) => return (Err(e), upload_id),
                    };

                    parts.push(PartInfo {
                        number: part_number,
                        etag: resp.etag,
                        size: length,
                    });

                    offset += length;
                    size -= length;
                }
            }
        }

        let parts: Vec<crate::s3::types::Part> = parts
            .into_iter()
            .map(|p| crate::s3::types::Part {
                number: p.number,
                etag: p.etag,
            })
            .collect();

        let resp = self
            .client
            .complete_multipart_upload(&self.bucket, &self.object, &upload_id, parts)
            .region(self.region.clone())
            .send()
            .await;

        match resp {
            Ok(v) => (
                Ok(ComposeObjectResponse {
                    headers: v.headers,
                    bucket: v.bucket,
                    object: v.object,
                    region: v.region,
                    etag: v.etag,
                    version_id: v.version_id,
                }),
                upload_id,
            ),
            Err(e) => (Err(e), upload_id),
        }
    }
}
