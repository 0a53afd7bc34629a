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

//! Error definitions for S3 operations.
//!
//! Every operation returns the single [`Error`] type; callers dispatch on
//! [`Error::kind`] rather than on per-failure-mode types. Server errors
//! additionally carry the S3 [`ErrorCode`] and the request/host id and
//! resource context reported by the service.

use crate::s3::utils::get_default_text;
use bytes::{Buf, Bytes};
use std::fmt;
use xmltree::Element;

/// Broad classification of a failure, the primary dispatch point for
/// callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-side precondition violated: invalid bucket or object name,
    /// bad offsets, expiry out of range, encryption over plain HTTP.
    Argument,
    /// Unusable credentials or a signature the server rejected.
    Auth,
    /// The named bucket, object, upload or subresource does not exist.
    NotFound,
    /// The resource exists but conflicts with the request.
    Conflict,
    /// Connection failures, timeouts, unexpected EOF.
    Transport,
    /// Malformed XML, unexpected HTTP status, protocol-level limits.
    Protocol,
    /// Bugs escaping the categories above.
    Internal,
}

/// S3 error codes, both server-reported and synthesized from bare HTTP
/// status codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Redirect,
    InvalidUri,
    AccessDenied,
    InvalidAccessKeyId,
    SignatureDoesNotMatch,
    ExpiredToken,
    NoSuchKey,
    NoSuchBucket,
    NoSuchUpload,
    NoSuchBucketPolicy,
    NoSuchLifecycleConfiguration,
    NoSuchObjectLockConfiguration,
    NoSuchTagSet,
    ServerSideEncryptionConfigurationNotFoundError,
    ResourceNotFound,
    MethodNotAllowed,
    ResourceConflict,
    BucketAlreadyExists,
    BucketAlreadyOwnedByYou,
    BucketNotEmpty,
    BucketPolicyTooLarge,
    Other(String),
}

impl ErrorCode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "redirect" | "temporaryredirect" | "permanentredirect" => ErrorCode::Redirect,
            "invaliduri" => ErrorCode::InvalidUri,
            "accessdenied" => ErrorCode::AccessDenied,
            "invalidaccesskeyid" => ErrorCode::InvalidAccessKeyId,
            "signaturedoesnotmatch" => ErrorCode::SignatureDoesNotMatch,
            "expiredtoken" => ErrorCode::ExpiredToken,
            "nosuchkey" => ErrorCode::NoSuchKey,
            "nosuchbucket" => ErrorCode::NoSuchBucket,
            "nosuchupload" => ErrorCode::NoSuchUpload,
            "nosuchbucketpolicy" => ErrorCode::NoSuchBucketPolicy,
            "nosuchlifecycleconfiguration" => ErrorCode::NoSuchLifecycleConfiguration,
            "nosuchobjectlockconfiguration" => ErrorCode::NoSuchObjectLockConfiguration,
            "nosuchtagset" => ErrorCode::NoSuchTagSet,
            "serversideencryptionconfigurationnotfounderror" => {
                ErrorCode::ServerSideEncryptionConfigurationNotFoundError
            }
            "resourcenotfound" => ErrorCode::ResourceNotFound,
            "methodnotallowed" => ErrorCode::MethodNotAllowed,
            "resourceconflict" => ErrorCode::ResourceConflict,
            "bucketalreadyexists" => ErrorCode::BucketAlreadyExists,
            "bucketalreadyownedbyyou" => ErrorCode::BucketAlreadyOwnedByYou,
            "bucketnotempty" => ErrorCode::BucketNotEmpty,
            "bucketpolicytoolargeexception" => ErrorCode::BucketPolicyTooLarge,
            v => ErrorCode::Other(v.to_owned()),
        }
    }

    /// Maps a server error code to its domain-level kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::AccessDenied
            | ErrorCode::InvalidAccessKeyId
            | ErrorCode::SignatureDoesNotMatch
            | ErrorCode::ExpiredToken => ErrorKind::Auth,
            ErrorCode::NoSuchKey
            | ErrorCode::NoSuchBucket
            | ErrorCode::NoSuchUpload
            | ErrorCode::NoSuchBucketPolicy
            | ErrorCode::NoSuchLifecycleConfiguration
            | ErrorCode::NoSuchObjectLockConfiguration
            | ErrorCode::NoSuchTagSet
            | ErrorCode::ServerSideEncryptionConfigurationNotFoundError
            | ErrorCode::ResourceNotFound => ErrorKind::NotFound,
            ErrorCode::ResourceConflict
            | ErrorCode::BucketAlreadyExists
            | ErrorCode::BucketAlreadyOwnedByYou
            | ErrorCode::BucketNotEmpty => ErrorKind::Conflict,
            ErrorCode::Redirect
            | ErrorCode::InvalidUri
            | ErrorCode::MethodNotAllowed
            | ErrorCode::BucketPolicyTooLarge
            | ErrorCode::Other(_) => ErrorKind::Protocol,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Other(v) => f.write_str(v),
            v => write!(f, "{v:?}"),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Error document returned by the server for failed S3 operations
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub resource: String,
    pub request_id: String,
    pub host_id: String,
    pub bucket_name: String,
    pub object_name: String,
}

impl ErrorResponse {
    pub fn parse(body: Bytes) -> Result<Self, Error> {
        let root = Element::parse(body.reader())?;

        Ok(Self {
            code: get_default_text(&root, "Code"),
            message: get_default_text(&root, "Message"),
            resource: get_default_text(&root, "Resource"),
            request_id: get_default_text(&root, "RequestId"),
            host_id: get_default_text(&root, "HostId"),
            bucket_name: get_default_text(&root, "BucketName"),
            object_name: get_default_text(&root, "Key"),
        })
    }
}

/// The error type of every S3 operation in this crate.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: Option<ErrorCode>,
    resource: Option<String>,
    request_id: Option<String>,
    host_id: Option<String>,
    bucket: Option<String>,
    object: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            resource: None,
            request_id: None,
            host_id: None,
            bucket: None,
            object: None,
            source: None,
        }
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// A non-2xx response whose body could not be interpreted as an S3
    /// error document.
    pub(crate) fn invalid_response(status_code: u16, content_type: &str) -> Self {
        Self::new(
            ErrorKind::Transport,
            format!(
                "invalid response received; status code: {status_code}; content-type: {content_type}"
            ),
        )
    }

    /// Builds the error for a parsed (or synthesized) server error
    /// document.
    pub(crate) fn s3_server(code: ErrorCode, resp: ErrorResponse) -> Self {
        let mut err = Self::new(
            code.kind(),
            format!(
                "s3 operation failed; code: {}, message: {}, resource: {}, request_id: {}, host_id: {}",
                code, resp.message, resp.resource, resp.request_id, resp.host_id
            ),
        );
        err.code = Some(code);
        err.resource = (!resp.resource.is_empty()).then_some(resp.resource);
        err.request_id = (!resp.request_id.is_empty()).then_some(resp.request_id);
        err.host_id = (!resp.host_id.is_empty()).then_some(resp.host_id);
        err.bucket = (!resp.bucket_name.is_empty()).then_some(resp.bucket_name);
        err.object = (!resp.object_name.is_empty()).then_some(resp.object_name);
        err
    }

    pub(crate) fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub(crate) fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// The domain-level classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The S3 error code, when the failure came from the server.
    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// The resource the server reported for this failure.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The request id the server reported for this failure.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The host id the server reported for this failure.
    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    /// The bucket involved, when known.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// The object involved, when known.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::transport(err.to_string()).with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::transport(err.to_string()).with_source(err)
    }
}

impl From<xmltree::ParseError> for Error {
    fn from(err: xmltree::ParseError) -> Self {
        Error::protocol(format!("malformed XML: {err}")).with_source(err)
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::protocol(format!("malformed timestamp: {err}")).with_source(err)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::protocol(format!("malformed integer: {err}")).with_source(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::protocol(format!("invalid UTF-8: {err}")).with_source(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::protocol(format!("invalid UTF-8: {err}")).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::protocol(format!("malformed JSON: {err}")).with_source(err)
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Error::protocol(format!("non-ASCII header value: {err}")).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_kinds() {
        assert_eq!(ErrorCode::parse("NoSuchKey").kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::parse("AccessDenied").kind(), ErrorKind::Auth);
        assert_eq!(
            ErrorCode::parse("BucketAlreadyOwnedByYou").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ErrorCode::parse("SomethingNovel").kind(),
            ErrorKind::Protocol
        );
    }

    #[test]
    fn error_document_is_parsed() {
        let body = Bytes::from_static(
            b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
              <Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message>\
              <Key>photos/cat.jpg</Key><BucketName>mybucket</BucketName>\
              <Resource>/mybucket/photos/cat.jpg</Resource>\
              <RequestId>4442587FB7D0A2F9</RequestId><HostId>host-1</HostId></Error>",
        );
        let resp = ErrorResponse::parse(body).unwrap();
        assert_eq!(resp.code, "NoSuchKey");
        assert_eq!(resp.bucket_name, "mybucket");
        assert_eq!(resp.object_name, "photos/cat.jpg");

        let err = Error::s3_server(ErrorCode::parse(&resp.code), resp);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), Some(&ErrorCode::NoSuchKey));
        assert_eq!(err.request_id(), Some("4442587FB7D0A2F9"));
        assert_eq!(err.bucket(), Some("mybucket"));
        assert_eq!(err.object(), Some("photos/cat.jpg"));
    }

    #[test]
    fn malformed_error_document_is_protocol_error() {
        let err = ErrorResponse::parse(Bytes::from_static(b"this is not XML")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
