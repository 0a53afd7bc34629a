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

//! Various types for S3 API requests and responses

use crate::s3::client::{Client, DEFAULT_REGION};
use crate::s3::error::Error;
use crate::s3::multimap::Multimap;
use crate::s3::object_content::ContentStream;
use crate::s3::segmented_bytes::SegmentedBytes;
use crate::s3::utils::UtcTime;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use http::Method;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A request payload: either replayable buffered data or a single-shot
/// stream of known length. The request pipeline picks the signing mode from
/// this variant (streams over plain HTTP are chunk-signed).
pub enum Body {
    Data(Arc<SegmentedBytes>),
    Stream(ContentStream, u64),
}

impl Body {
    pub fn len(&self) -> u64 {
        match self {
            Body::Data(sb) => sb.len() as u64,
            Body::Stream(_, len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Data(sb) => write!(f, "Body::Data({} bytes)", sb.len()),
            Body::Stream(_, len) => write!(f, "Body::Stream({len} bytes)"),
        }
    }
}

impl From<SegmentedBytes> for Body {
    fn from(sb: SegmentedBytes) -> Self {
        Body::Data(Arc::new(sb))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Data(Arc::new(SegmentedBytes::from(b)))
    }
}

/// Generic S3 request, executed by the client's request pipeline.
#[derive(Debug)]
pub struct S3Request {
    pub(crate) client: Client,

    pub method: Method,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub query_params: Multimap,
    pub headers: Multimap,
    pub body: Option<Body>,

    /// Region resolved by [`S3Request::execute`]
    pub(crate) inner_region: String,
}

impl S3Request {
    pub fn new(client: Client, method: Method) -> S3Request {
        S3Request {
            client,
            method,
            region: None,
            bucket: None,
            object: None,
            query_params: Multimap::new(),
            headers: Multimap::new(),
            body: None,
            inner_region: String::new(),
        }
    }

    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn bucket(mut self, bucket: Option<String>) -> Self {
        self.bucket = bucket;
        self
    }

    pub fn object(mut self, object: Option<String>) -> Self {
        self.object = object;
        self
    }

    pub fn query_params(mut self, query_params: Multimap) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn headers(mut self, headers: Multimap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    /// The region the request was signed against.
    pub fn computed_region(&self) -> &str {
        &self.inner_region
    }

    pub async fn execute(&mut self) -> Result<reqwest::Response, Error> {
        // Look up the region of the bucket when one is involved.
        self.inner_region = match &self.bucket {
            Some(bucket) => {
                self.client
                    .get_region_cached(bucket, self.region.as_deref())
                    .await?
            }
            None => self
                .client
                .configured_region()
                .unwrap_or(DEFAULT_REGION)
                .to_string(),
        };

        self.client
            .execute(
                self.method.clone(),
                &self.inner_region,
                &mut self.headers,
                &self.query_params,
                self.bucket.as_deref(),
                self.object.as_deref(),
                self.body.take(),
            )
            .await
    }
}

/// Conversion of an argument builder into an executable [`S3Request`].
pub trait ToS3Request: Sized {
    fn to_s3request(self) -> Result<S3Request, Error>;
}

/// Construction of a typed response from the executed exchange. The raw
/// result is passed so responses may absorb expected errors (e.g. a
/// missing subresource mapping to an empty configuration).
#[async_trait]
pub trait FromS3Response: Sized {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error>;
}

/// An executable S3 API operation.
#[async_trait]
pub trait S3Api: ToS3Request + Send {
    type S3Response: FromS3Response;

    async fn send(self) -> Result<Self::S3Response, Error> {
        let mut req = self.to_s3request()?;
        let resp = req.execute().await;
        Self::S3Response::from_s3response(req, resp).await
    }
}

/// Conversion of a listing argument builder into a lazy paginated stream.
/// Page errors surface as one terminal stream element.
#[async_trait]
pub trait ToStream: Sized {
    type Item;
    async fn to_stream(self) -> Box<dyn Stream<Item = Result<Self::Item, Error>> + Unpin + Send>;
}

/// One item of an object listing: an object, a delete marker, or a
/// synthetic "directory" entry for a common prefix.
#[derive(Clone, Debug, Default)]
pub struct ListEntry {
    pub name: String,
    pub last_modified: Option<UtcTime>,
    pub etag: Option<String>, // except DeleteMarker
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub size: Option<u64>, // except DeleteMarker
    pub storage_class: Option<String>,
    pub is_latest: bool,            // except ListObjects V1/V2
    pub version_id: Option<String>, // except ListObjects V1/V2
    pub user_metadata: Option<HashMap<String, String>>,
    pub is_prefix: bool,
    pub is_delete_marker: bool,
    pub encoding_type: Option<String>,
}

/// Contains bucket name and creation date
#[derive(Clone, Debug)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<UtcTime>,
}

/// Contains part number and etag of a multipart upload part
#[derive(Clone, Debug)]
pub struct Part {
    pub number: u16,
    pub etag: String,
}

/// Part information as reported by ListParts
#[derive(Clone, Debug)]
pub struct PartInfo {
    pub number: u16,
    pub etag: String,
    pub size: u64,
}

/// One in-progress multipart upload as reported by ListMultipartUploads
#[derive(Clone, Debug, Default)]
pub struct MultipartUpload {
    pub key: String,
    pub upload_id: String,
    pub initiator_id: Option<String>,
    pub owner_id: Option<String>,
    pub storage_class: Option<String>,
    pub initiated: Option<UtcTime>,
    /// Sum of the sizes of the upload's parts; filled only when the listing
    /// was asked to enumerate parts.
    pub aggregated_part_size: Option<u64>,
}

/// Contains retention mode information
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetentionMode {
    GOVERNANCE,
    COMPLIANCE,
}

impl RetentionMode {
    pub fn parse(s: &str) -> Result<RetentionMode, Error> {
        match s {
            "GOVERNANCE" => Ok(RetentionMode::GOVERNANCE),
            "COMPLIANCE" => Ok(RetentionMode::COMPLIANCE),
            _ => Err(Error::protocol(format!("invalid retention mode {s}"))),
        }
    }
}

impl fmt::Display for RetentionMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RetentionMode::GOVERNANCE => write!(f, "GOVERNANCE"),
            RetentionMode::COMPLIANCE => write!(f, "COMPLIANCE"),
        }
    }
}

/// Contains retention mode and retain until date
#[derive(Clone, Debug)]
pub struct Retention {
    pub mode: RetentionMode,
    pub retain_until_date: UtcTime,
}

/// Parses a legal hold status value
pub fn parse_legal_hold(s: &str) -> Result<bool, Error> {
    match s {
        "ON" => Ok(true),
        "OFF" => Ok(false),
        _ => Err(Error::protocol(format!("invalid legal hold {s}"))),
    }
}

/// Metadata/tagging directive of a server-side copy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    Copy,
    Replace,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Directive::Copy => write!(f, "COPY"),
            Directive::Replace => write!(f, "REPLACE"),
        }
    }
}

/// Bucket versioning state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
}

impl fmt::Display for VersioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VersioningStatus::Enabled => write!(f, "Enabled"),
            VersioningStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

// region: select

/// Compression types
#[derive(Clone, Debug)]
pub enum CompressionType {
    NONE,
    GZIP,
    BZIP2,
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressionType::NONE => write!(f, "NONE"),
            CompressionType::GZIP => write!(f, "GZIP"),
            CompressionType::BZIP2 => write!(f, "BZIP2"),
        }
    }
}

/// File header information types
#[derive(Clone, Debug)]
pub enum FileHeaderInfo {
    USE,
    IGNORE,
    NONE,
}

impl fmt::Display for FileHeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileHeaderInfo::IGNORE => write!(f, "IGNORE"),
            FileHeaderInfo::USE => write!(f, "USE"),
            FileHeaderInfo::NONE => write!(f, "NONE"),
        }
    }
}

/// JSON document types
#[derive(Clone, Debug)]
pub enum JsonType {
    DOCUMENT,
    LINES,
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JsonType::DOCUMENT => write!(f, "DOCUMENT"),
            JsonType::LINES => write!(f, "LINES"),
        }
    }
}

/// Quote fields types
#[derive(Clone, Debug)]
pub enum QuoteFields {
    ALWAYS,
    ASNEEDED,
}

impl fmt::Display for QuoteFields {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuoteFields::ALWAYS => write!(f, "ALWAYS"),
            QuoteFields::ASNEEDED => write!(f, "ASNEEDED"),
        }
    }
}

/// CSV input serialization definitions
#[derive(Clone, Debug, Default)]
pub struct CsvInputSerialization {
    pub compression_type: Option<CompressionType>,
    pub allow_quoted_record_delimiter: bool,
    pub comments: Option<char>,
    pub field_delimiter: Option<char>,
    pub file_header_info: Option<FileHeaderInfo>,
    pub quote_character: Option<char>,
    pub quote_escape_character: Option<char>,
    pub record_delimiter: Option<char>,
}

/// JSON input serialization definitions
#[derive(Clone, Debug, Default)]
pub struct JsonInputSerialization {
    pub compression_type: Option<CompressionType>,
    pub json_type: Option<JsonType>,
}

/// Parquet input serialization definitions
#[derive(Clone, Debug, Default)]
pub struct ParquetInputSerialization;

/// CSV output serialization definitions
#[derive(Clone, Debug, Default)]
pub struct CsvOutputSerialization {
    pub field_delimiter: Option<char>,
    pub quote_character: Option<char>,
    pub quote_escape_character: Option<char>,
    pub quote_fields: Option<QuoteFields>,
    pub record_delimiter: Option<char>,
}

/// JSON output serialization definitions
#[derive(Clone, Debug, Default)]
pub struct JsonOutputSerialization {
    pub record_delimiter: Option<char>,
}

/// Select request for the SelectObjectContent API
#[derive(Clone, Debug, Default)]
pub struct SelectRequest {
    pub expr: String,
    pub csv_input: Option<CsvInputSerialization>,
    pub json_input: Option<JsonInputSerialization>,
    pub parquet_input: Option<ParquetInputSerialization>,
    pub csv_output: Option<CsvOutputSerialization>,
    pub json_output: Option<JsonOutputSerialization>,
    pub request_progress: bool,
    pub scan_start_range: Option<usize>,
    pub scan_end_range: Option<usize>,
}

impl SelectRequest {
    pub fn new_csv_input_output(
        expr: &str,
        csv_input: CsvInputSerialization,
        csv_output: CsvOutputSerialization,
    ) -> Result<SelectRequest, Error> {
        if expr.is_empty() {
            return Err(Error::argument("select expression cannot be empty"));
        }

        Ok(SelectRequest {
            expr: expr.to_string(),
            csv_input: Some(csv_input),
            csv_output: Some(csv_output),
            ..Default::default()
        })
    }

    pub fn new_csv_input_json_output(
        expr: &str,
        csv_input: CsvInputSerialization,
        json_output: JsonOutputSerialization,
    ) -> Result<SelectRequest, Error> {
        if expr.is_empty() {
            return Err(Error::argument("select expression cannot be empty"));
        }

        Ok(SelectRequest {
            expr: expr.to_string(),
            csv_input: Some(csv_input),
            json_output: Some(json_output),
            ..Default::default()
        })
    }

    pub fn new_json_input_output(
        expr: &str,
        json_input: JsonInputSerialization,
        json_output: JsonOutputSerialization,
    ) -> Result<SelectRequest, Error> {
        if expr.is_empty() {
            return Err(Error::argument("select expression cannot be empty"));
        }

        Ok(SelectRequest {
            expr: expr.to_string(),
            json_input: Some(json_input),
            json_output: Some(json_output),
            ..Default::default()
        })
    }

    pub fn new_parquet_input_csv_output(
        expr: &str,
        parquet_input: ParquetInputSerialization,
        csv_output: CsvOutputSerialization,
    ) -> Result<SelectRequest, Error> {
        if expr.is_empty() {
            return Err(Error::argument("select expression cannot be empty"));
        }

        Ok(SelectRequest {
            expr: expr.to_string(),
            parquet_input: Some(parquet_input),
            csv_output: Some(csv_output),
            ..Default::default()
        })
    }

    pub fn to_xml(&self) -> String {
        let mut data = String::from("<SelectObjectContentRequest>");

        data.push_str("<Expression>");
        data.push_str(&self.expr);
        data.push_str("</Expression>");
        data.push_str("<ExpressionType>SQL</ExpressionType>");

        data.push_str("<InputSerialization>");
        if let Some(c) = &self.csv_input {
            if let Some(v) = &c.compression_type {
                data.push_str("<CompressionType>");
                data.push_str(&v.to_string());
                data.push_str("</CompressionType>");
            }

            data.push_str("<CSV>");
            if c.allow_quoted_record_delimiter {
                data.push_str("<AllowQuotedRecordDelimiter>true</AllowQuotedRecordDelimiter>");
            }
            if let Some(v) = c.comments {
                data.push_str("<Comments>");
                data.push(v);
                data.push_str("</Comments>");
            }
            if let Some(v) = c.field_delimiter {
                data.push_str("<FieldDelimiter>");
                data.push(v);
                data.push_str("</FieldDelimiter>");
            }
            if let Some(v) = &c.file_header_info {
                data.push_str("<FileHeaderInfo>");
                data.push_str(&v.to_string());
                data.push_str("</FileHeaderInfo>");
            }
            if let Some(v) = c.quote_character {
                data.push_str("<QuoteCharacter>");
                data.push(v);
                data.push_str("</QuoteCharacter>");
            }
            if let Some(v) = c.quote_escape_character {
                data.push_str("<QuoteEscapeCharacter>");
                data.push(v);
                data.push_str("</QuoteEscapeCharacter>");
            }
            if let Some(v) = c.record_delimiter {
                data.push_str("<RecordDelimiter>");
                data.push(v);
                data.push_str("</RecordDelimiter>");
            }
            data.push_str("</CSV>");
        } else if let Some(j) = &self.json_input {
            if let Some(v) = &j.compression_type {
                data.push_str("<CompressionType>");
                data.push_str(&v.to_string());
                data.push_str("</CompressionType>");
            }
            data.push_str("<JSON>");
            if let Some(v) = &j.json_type {
                data.push_str("<Type>");
                data.push_str(&v.to_string());
                data.push_str("</Type>");
            }
            data.push_str("</JSON>");
        } else if self.parquet_input.is_some() {
            data.push_str("<Parquet></Parquet>");
        }
        data.push_str("</InputSerialization>");

        data.push_str("<OutputSerialization>");
        if let Some(c) = &self.csv_output {
            data.push_str("<CSV>");
            if let Some(v) = c.field_delimiter {
                data.push_str("<FieldDelimiter>");
                data.push(v);
                data.push_str("</FieldDelimiter>");
            }
            if let Some(v) = c.quote_character {
                data.push_str("<QuoteCharacter>");
                data.push(v);
                data.push_str("</QuoteCharacter>");
            }
            if let Some(v) = c.quote_escape_character {
                data.push_str("<QuoteEscapeCharacter>");
                data.push(v);
                data.push_str("</QuoteEscapeCharacter>");
            }
            if let Some(v) = &c.quote_fields {
                data.push_str("<QuoteFields>");
                data.push_str(&v.to_string());
                data.push_str("</QuoteFields>");
            }
            if let Some(v) = c.record_delimiter {
                data.push_str("<RecordDelimiter>");
                data.push(v);
                data.push_str("</RecordDelimiter>");
            }
            data.push_str("</CSV>");
        } else if let Some(j) = &self.json_output {
            data.push_str("<JSON>");
            if let Some(v) = j.record_delimiter {
                data.push_str("<RecordDelimiter>");
                data.push(v);
                data.push_str("</RecordDelimiter>");
            }
            data.push_str("</JSON>");
        }
        data.push_str("</OutputSerialization>");

        if self.request_progress {
            data.push_str("<RequestProgress><Enabled>true</Enabled></RequestProgress>");
        }

        if let (Some(s), Some(e)) = (self.scan_start_range, self.scan_end_range) {
            data.push_str("<ScanRange>");
            data.push_str("<Start>");
            data.push_str(&s.to_string());
            data.push_str("</Start>");
            data.push_str("<End>");
            data.push_str(&e.to_string());
            data.push_str("</End>");
            data.push_str("</ScanRange>");
        }

        data.push_str("</SelectObjectContentRequest>");
        data
    }
}

/// Progress information of the SelectObjectContent API
#[derive(Clone, Debug, Default)]
pub struct SelectProgress {
    pub bytes_scanned: usize,
    pub bytes_progressed: usize,
    pub bytes_returned: usize,
}

// endregion: select

// region: notification records

/// User identity contains principal ID
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UserIdentity {
    #[serde(alias = "principalId", default)]
    pub principal_id: String,
}

/// Owner identity contains principal ID
pub type OwnerIdentity = UserIdentity;

/// Bucket information within a notification record
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EventBucket {
    #[serde(alias = "name", default)]
    pub name: String,
    #[serde(alias = "arn", default)]
    pub arn: String,
    #[serde(alias = "ownerIdentity", default)]
    pub owner_identity: OwnerIdentity,
}

/// Object information within a notification record
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EventObject {
    #[serde(alias = "key", default)]
    pub key: String,
    #[serde(alias = "size")]
    pub size: Option<u64>,
    #[serde(alias = "eTag")]
    pub etag: Option<String>,
    #[serde(alias = "contentType")]
    pub content_type: Option<String>,
    #[serde(alias = "userMetadata")]
    pub user_metadata: Option<HashMap<String, String>>,
    #[serde(alias = "versionId", default)]
    pub version_id: String,
    #[serde(alias = "sequencer", default)]
    pub sequencer: String,
}

/// S3 payload of a notification record
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EventMeta {
    #[serde(alias = "s3SchemaVersion", default)]
    pub s3_schema_version: String,
    #[serde(alias = "configurationId", default)]
    pub configuration_id: String,
    #[serde(alias = "bucket", default)]
    pub bucket: EventBucket,
    #[serde(alias = "object", default)]
    pub object: EventObject,
}

/// Source host information of a notification record
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EventSource {
    #[serde(alias = "host", default)]
    pub host: String,
    #[serde(alias = "port")]
    pub port: Option<String>,
    #[serde(alias = "userAgent", default)]
    pub user_agent: String,
}

/// One bucket notification event
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationRecord {
    #[serde(alias = "eventVersion", default)]
    pub event_version: String,
    #[serde(alias = "eventSource", default)]
    pub event_source: String,
    #[serde(alias = "awsRegion", default)]
    pub aws_region: String,
    #[serde(
        alias = "eventTime",
        default,
        with = "crate::s3::utils::aws_date_format"
    )]
    pub event_time: UtcTime,
    #[serde(alias = "eventName", default)]
    pub event_name: String,
    #[serde(alias = "userIdentity", default)]
    pub user_identity: UserIdentity,
    #[serde(alias = "requestParameters", default)]
    pub request_parameters: Option<HashMap<String, String>>,
    #[serde(alias = "responseElements", default)]
    pub response_elements: HashMap<String, String>,
    #[serde(alias = "s3", default)]
    pub s3: EventMeta,
    #[serde(alias = "source", default)]
    pub source: EventSource,
}

/// Collection of notification records as delivered by the listen API
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationRecords {
    #[serde(alias = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

// endregion: notification records
