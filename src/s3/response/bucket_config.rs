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

//! Responses of bucket subresource configuration APIs.

use crate::s3::error::{Error, ErrorCode};
use crate::s3::types::{FromS3Response, S3Request, VersioningStatus};
use crate::s3::utils::get_option_text;
use async_trait::async_trait;
use bytes::Buf;
use http::HeaderMap;
use std::mem;
use xmltree::Element;

// Implements `FromS3Response` for responses carrying no payload beyond the
// headers and bucket identity.
macro_rules! impl_simple_bucket_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            #[async_trait]
            impl FromS3Response for $ty {
                async fn from_s3response(
                    req: S3Request,
                    resp: Result<reqwest::Response, Error>,
                ) -> Result<Self, Error> {
                    let mut resp = resp?;
                    Ok(Self {
                        headers: mem::take(resp.headers_mut()),
                        bucket: req.bucket.clone().unwrap_or_default(),
                    })
                }
            }
        )+
    };
}

// Implements `FromS3Response` for deletes that treat an already-absent
// subresource as success.
macro_rules! impl_absorbing_delete_response {
    ($($ty:ty => $code:path),+ $(,)?) => {
        $(
            #[async_trait]
            impl FromS3Response for $ty {
                async fn from_s3response(
                    req: S3Request,
                    resp: Result<reqwest::Response, Error>,
                ) -> Result<Self, Error> {
                    let bucket = req.bucket.clone().unwrap_or_default();
                    match resp {
                        Ok(mut v) => Ok(Self {
                            headers: mem::take(v.headers_mut()),
                            bucket,
                        }),
                        Err(e) if e.code() == Some(&$code) => Ok(Self {
                            headers: HeaderMap::new(),
                            bucket,
                        }),
                        Err(e) => Err(e),
                    }
                }
            }
        )+
    };
}

// Implements `FromS3Response` for configuration reads returning the raw
// document; an absent subresource yields an empty configuration when the
// listed code matches.
macro_rules! impl_config_get_response {
    ($($ty:ty => $code:expr),+ $(,)?) => {
        $(
            #[async_trait]
            impl FromS3Response for $ty {
                async fn from_s3response(
                    req: S3Request,
                    resp: Result<reqwest::Response, Error>,
                ) -> Result<Self, Error> {
                    let bucket = req.bucket.clone().unwrap_or_default();
                    match resp {
                        Ok(mut v) => {
                            let headers = mem::take(v.headers_mut());
                            let body = v.bytes().await?;
                            Ok(Self {
                                headers,
                                bucket,
                                config: String::from_utf8(body.to_vec())?,
                            })
                        }
                        Err(e) if $code.map_or(false, |c: ErrorCode| e.code() == Some(&c)) => {
                            Ok(Self {
                                headers: HeaderMap::new(),
                                bucket,
                                config: String::new(),
                            })
                        }
                        Err(e) => Err(e),
                    }
                }
            }
        )+
    };
}

/// Response of the GetBucketPolicy S3 API. A bucket without a policy yields
/// an empty configuration.
#[derive(Clone, Debug)]
pub struct GetBucketPolicyResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    /// The policy document as JSON text.
    pub config: String,
}

/// Response of the PutBucketPolicy S3 API
#[derive(Clone, Debug)]
pub struct PutBucketPolicyResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the DeleteBucketPolicy S3 API
#[derive(Clone, Debug)]
pub struct DeleteBucketPolicyResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the GetBucketVersioning S3 API
#[derive(Clone, Debug)]
pub struct GetBucketVersioningResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    /// `None` when versioning was never configured on the bucket.
    pub status: Option<VersioningStatus>,
}

#[async_trait]
impl FromS3Response for GetBucketVersioningResponse {
    async fn from_s3response(
        req: S3Request,
        resp: Result<reqwest::Response, Error>,
    ) -> Result<Self, Error> {
        let mut resp = resp?;
        let headers = mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;

        let status = match get_option_text(&root, "Status").as_deref() {
            Some("Enabled") => Some(VersioningStatus::Enabled),
            Some("Suspended") => Some(VersioningStatus::Suspended),
            _ => None,
        };

        Ok(Self {
            headers,
            bucket: req.bucket.clone().unwrap_or_default(),
            status,
        })
    }
}

/// Response of the PutBucketVersioning S3 API
#[derive(Clone, Debug)]
pub struct PutBucketVersioningResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the GetBucketLifecycle S3 API. A bucket without lifecycle
/// rules yields an empty configuration.
#[derive(Clone, Debug)]
pub struct GetBucketLifecycleResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub config: String,
}

/// Response of the PutBucketLifecycle S3 API
#[derive(Clone, Debug)]
pub struct PutBucketLifecycleResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the DeleteBucketLifecycle S3 API
#[derive(Clone, Debug)]
pub struct DeleteBucketLifecycleResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the GetBucketEncryption S3 API. A bucket without encryption
/// configuration yields an empty configuration.
#[derive(Clone, Debug)]
pub struct GetBucketEncryptionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub config: String,
}

/// Response of the PutBucketEncryption S3 API
#[derive(Clone, Debug)]
pub struct PutBucketEncryptionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the DeleteBucketEncryption S3 API
#[derive(Clone, Debug)]
pub struct DeleteBucketEncryptionResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the GetBucketNotification S3 API
#[derive(Clone, Debug)]
pub struct GetBucketNotificationResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub config: String,
}

/// Response of the PutBucketNotification S3 API
#[derive(Clone, Debug)]
pub struct PutBucketNotificationResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of removing a bucket's notification configuration
#[derive(Clone, Debug)]
pub struct DeleteBucketNotificationResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of the GetObjectLockConfiguration S3 API
#[derive(Clone, Debug)]
pub struct GetObjectLockConfigResponse {
    pub headers: HeaderMap,
    pub bucket: String,
    pub config: String,
}

/// Response of the PutObjectLockConfiguration S3 API
#[derive(Clone, Debug)]
pub struct SetObjectLockConfigResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

/// Response of clearing a bucket's object-lock rule
#[derive(Clone, Debug)]
pub struct DeleteObjectLockConfigResponse {
    pub headers: HeaderMap,
    pub bucket: String,
}

impl_simple_bucket_response!(
    PutBucketPolicyResponse,
    PutBucketVersioningResponse,
    PutBucketLifecycleResponse,
    PutBucketEncryptionResponse,
    PutBucketNotificationResponse,
    DeleteBucketNotificationResponse,
    SetObjectLockConfigResponse,
    DeleteObjectLockConfigResponse,
);

impl_absorbing_delete_response!(
    DeleteBucketPolicyResponse => ErrorCode::NoSuchBucketPolicy,
    DeleteBucketLifecycleResponse => ErrorCode::NoSuchLifecycleConfiguration,
    DeleteBucketEncryptionResponse => ErrorCode::ServerSideEncryptionConfigurationNotFoundError,
);

impl_config_get_response!(
    GetBucketPolicyResponse => Some(ErrorCode::NoSuchBucketPolicy),
    GetBucketLifecycleResponse => Some(ErrorCode::NoSuchLifecycleConfiguration),
    GetBucketEncryptionResponse => Some(ErrorCode::ServerSideEncryptionConfigurationNotFoundError),
    GetBucketNotificationResponse => None::<ErrorCode>,
    GetObjectLockConfigResponse => None::<ErrorCode>,
);
