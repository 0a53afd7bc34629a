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

//! Argument builders for bucket subresource configuration APIs: policy,
//! versioning, lifecycle, encryption, notification and object-lock.
//!
//! Configuration documents are carried as opaque strings; their content is
//! the caller's business.

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::header_constants::*;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::*;
use crate::s3::types::{S3Api, S3Request, ToS3Request, VersioningStatus};
use crate::s3::utils::{check_bucket_name, insert, md5sum_hash};
use bytes::Bytes;
use http::Method;

/// Bucket policies larger than this are rejected client-side.
pub const MAX_BUCKET_POLICY_SIZE: usize = 12 * 1024; // 12 KiB

// Generates the struct and the common setters of a bucket subresource
// builder; each operation keeps its own `ToS3Request`.
macro_rules! bucket_config_builder {
    ($(#[$doc:meta])* $name:ident $(, $field:ident: $ftype:ty)*) => {
        $(#[$doc])*
        pub struct $name {
            client: Client,

            extra_headers: Option<Multimap>,
            extra_query_params: Option<Multimap>,
            region: Option<String>,
            bucket: String,
            $($field: $ftype,)*
        }

        impl $name {
            pub fn new(client: Client, bucket: &str $(, $field: $ftype)*) -> Self {
                Self {
                    client,
                    extra_headers: None,
                    extra_query_params: None,
                    region: None,
                    bucket: bucket.to_string(),
                    $($field,)*
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
    };
}

fn subresource_request(
    client: Client,
    method: Method,
    region: Option<String>,
    bucket: String,
    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    subresource: &str,
    body: Option<Bytes>,
) -> Result<S3Request, Error> {
    check_bucket_name(&bucket)?;

    Ok(S3Request::new(client, method)
        .region(region)
        .bucket(Some(bucket))
        .query_params(insert(extra_query_params, subresource))
        .headers(extra_headers.unwrap_or_default())
        .body(body.map(Into::into)))
}

// region: policy

bucket_config_builder!(
    /// Argument builder for the GetBucketPolicy S3 API
    GetBucketPolicy
);

impl S3Api for GetBucketPolicy {
    type S3Response = GetBucketPolicyResponse;
}

impl ToS3Request for GetBucketPolicy {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "policy",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutBucketPolicy S3 API
    PutBucketPolicy,
    config: String
);

impl S3Api for PutBucketPolicy {
    type S3Response = PutBucketPolicyResponse;
}

impl ToS3Request for PutBucketPolicy {
    fn to_s3request(self) -> Result<S3Request, Error> {
        if self.config.len() > MAX_BUCKET_POLICY_SIZE {
            return Err(Error::protocol(format!(
                "bucket policy exceeds the maximum allowed size of {MAX_BUCKET_POLICY_SIZE} bytes"
            )));
        }

        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/json");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "policy",
            Some(Bytes::from(self.config)),
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the DeleteBucketPolicy S3 API
    DeleteBucketPolicy
);

impl S3Api for DeleteBucketPolicy {
    type S3Response = DeleteBucketPolicyResponse;
}

impl ToS3Request for DeleteBucketPolicy {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::DELETE,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "policy",
            None,
        )
    }
}

// endregion: policy

// region: versioning

bucket_config_builder!(
    /// Argument builder for the GetBucketVersioning S3 API
    GetBucketVersioning
);

impl S3Api for GetBucketVersioning {
    type S3Response = GetBucketVersioningResponse;
}

impl ToS3Request for GetBucketVersioning {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "versioning",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutBucketVersioning S3 API
    PutBucketVersioning,
    status: VersioningStatus
);

impl S3Api for PutBucketVersioning {
    type S3Response = PutBucketVersioningResponse;
}

impl ToS3Request for PutBucketVersioning {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let body = Bytes::from(format!(
            "<VersioningConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><Status>{}</Status></VersioningConfiguration>",
            self.status
        ));

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "versioning",
            Some(body),
        )
    }
}

// endregion: versioning

// region: lifecycle

bucket_config_builder!(
    /// Argument builder for the GetBucketLifecycle S3 API
    GetBucketLifecycle
);

impl S3Api for GetBucketLifecycle {
    type S3Response = GetBucketLifecycleResponse;
}

impl ToS3Request for GetBucketLifecycle {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "lifecycle",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutBucketLifecycle S3 API
    PutBucketLifecycle,
    config: String
);

impl S3Api for PutBucketLifecycle {
    type S3Response = PutBucketLifecycleResponse;
}

impl ToS3Request for PutBucketLifecycle {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let body = Bytes::from(self.config);

        // Lifecycle configuration is one of the operations the service
        // requires a Content-MD5 for.
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_MD5, md5sum_hash(&body));
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "lifecycle",
            Some(body),
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the DeleteBucketLifecycle S3 API
    DeleteBucketLifecycle
);

impl S3Api for DeleteBucketLifecycle {
    type S3Response = DeleteBucketLifecycleResponse;
}

impl ToS3Request for DeleteBucketLifecycle {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::DELETE,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "lifecycle",
            None,
        )
    }
}

// endregion: lifecycle

// region: encryption

bucket_config_builder!(
    /// Argument builder for the GetBucketEncryption S3 API
    GetBucketEncryption
);

impl S3Api for GetBucketEncryption {
    type S3Response = GetBucketEncryptionResponse;
}

impl ToS3Request for GetBucketEncryption {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "encryption",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutBucketEncryption S3 API
    PutBucketEncryption,
    config: String
);

impl S3Api for PutBucketEncryption {
    type S3Response = PutBucketEncryptionResponse;
}

impl ToS3Request for PutBucketEncryption {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "encryption",
            Some(Bytes::from(self.config)),
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the DeleteBucketEncryption S3 API. Deleting an
    /// absent configuration is not an error.
    DeleteBucketEncryption
);

impl S3Api for DeleteBucketEncryption {
    type S3Response = DeleteBucketEncryptionResponse;
}

impl ToS3Request for DeleteBucketEncryption {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::DELETE,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "encryption",
            None,
        )
    }
}

// endregion: encryption

// region: notification

bucket_config_builder!(
    /// Argument builder for the GetBucketNotification S3 API
    GetBucketNotification
);

impl S3Api for GetBucketNotification {
    type S3Response = GetBucketNotificationResponse;
}

impl ToS3Request for GetBucketNotification {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "notification",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutBucketNotification S3 API
    PutBucketNotification,
    config: String
);

impl S3Api for PutBucketNotification {
    type S3Response = PutBucketNotificationResponse;
}

impl ToS3Request for PutBucketNotification {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "notification",
            Some(Bytes::from(self.config)),
        )
    }
}

bucket_config_builder!(
    /// Argument builder to remove all notification configuration from a
    /// bucket. The service models removal as storing an empty
    /// configuration.
    DeleteBucketNotification
);

impl S3Api for DeleteBucketNotification {
    type S3Response = DeleteBucketNotificationResponse;
}

impl ToS3Request for DeleteBucketNotification {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "notification",
            Some(Bytes::from_static(
                b"<NotificationConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"/>",
            )),
        )
    }
}

// endregion: notification

// region: object-lock

bucket_config_builder!(
    /// Argument builder for the GetObjectLockConfiguration S3 API
    GetObjectLockConfig
);

impl S3Api for GetObjectLockConfig {
    type S3Response = GetObjectLockConfigResponse;
}

impl ToS3Request for GetObjectLockConfig {
    fn to_s3request(self) -> Result<S3Request, Error> {
        subresource_request(
            self.client,
            Method::GET,
            self.region,
            self.bucket,
            self.extra_headers,
            self.extra_query_params,
            "object-lock",
            None,
        )
    }
}

bucket_config_builder!(
    /// Argument builder for the PutObjectLockConfiguration S3 API
    SetObjectLockConfig,
    config: String
);

impl S3Api for SetObjectLockConfig {
    type S3Response = SetObjectLockConfigResponse;
}

impl ToS3Request for SetObjectLockConfig {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "object-lock",
            Some(Bytes::from(self.config)),
        )
    }
}

bucket_config_builder!(
    /// Argument builder to clear a bucket's default object-lock rule by
    /// storing a bare configuration.
    DeleteObjectLockConfig
);

impl S3Api for DeleteObjectLockConfig {
    type S3Response = DeleteObjectLockConfigResponse;
}

impl ToS3Request for DeleteObjectLockConfig {
    fn to_s3request(self) -> Result<S3Request, Error> {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.add(CONTENT_TYPE, "application/xml");

        subresource_request(
            self.client,
            Method::PUT,
            self.region,
            self.bucket,
            Some(headers),
            self.extra_query_params,
            "object-lock",
            Some(Bytes::from_static(
                b"<ObjectLockConfiguration><ObjectLockEnabled>Enabled</ObjectLockEnabled></ObjectLockConfiguration>",
            )),
        )
    }
}

// endregion: object-lock
