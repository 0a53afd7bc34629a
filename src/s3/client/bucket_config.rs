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

//! Bucket subresource configuration operations.

use super::Client;
use crate::s3::builders::{
    DeleteBucketEncryption, DeleteBucketLifecycle, DeleteBucketNotification, DeleteBucketPolicy,
    DeleteObjectLockConfig, GetBucketEncryption, GetBucketLifecycle, GetBucketNotification,
    GetBucketPolicy, GetBucketVersioning, GetObjectLockConfig, PutBucketEncryption,
    PutBucketLifecycle, PutBucketNotification, PutBucketPolicy, PutBucketVersioning,
    SetObjectLockConfig,
};
use crate::s3::types::VersioningStatus;

impl Client {
    /// Creates a GetBucketPolicy request builder.
    pub fn get_bucket_policy(&self, bucket: &str) -> GetBucketPolicy {
        GetBucketPolicy::new(self.clone(), bucket)
    }

    /// Creates a PutBucketPolicy request builder for the given policy JSON.
    pub fn put_bucket_policy(&self, bucket: &str, config: String) -> PutBucketPolicy {
        PutBucketPolicy::new(self.clone(), bucket, config)
    }

    /// Creates a DeleteBucketPolicy request builder.
    pub fn delete_bucket_policy(&self, bucket: &str) -> DeleteBucketPolicy {
        DeleteBucketPolicy::new(self.clone(), bucket)
    }

    /// Creates a GetBucketVersioning request builder.
    pub fn get_bucket_versioning(&self, bucket: &str) -> GetBucketVersioning {
        GetBucketVersioning::new(self.clone(), bucket)
    }

    /// Creates a PutBucketVersioning request builder.
    pub fn put_bucket_versioning(
        &self,
        bucket: &str,
        status: VersioningStatus,
    ) -> PutBucketVersioning {
        PutBucketVersioning::new(self.clone(), bucket, status)
    }

    /// Creates a GetBucketLifecycle request builder.
    pub fn get_bucket_lifecycle(&self, bucket: &str) -> GetBucketLifecycle {
        GetBucketLifecycle::new(self.clone(), bucket)
    }

    /// Creates a PutBucketLifecycle request builder for the given
    /// configuration XML.
    pub fn put_bucket_lifecycle(&self, bucket: &str, config: String) -> PutBucketLifecycle {
        PutBucketLifecycle::new(self.clone(), bucket, config)
    }

    /// Creates a DeleteBucketLifecycle request builder.
    pub fn delete_bucket_lifecycle(&self, bucket: &str) -> DeleteBucketLifecycle {
        DeleteBucketLifecycle::new(self.clone(), bucket)
    }

    /// Creates a GetBucketEncryption request builder.
    pub fn get_bucket_encryption(&self, bucket: &str) -> GetBucketEncryption {
        GetBucketEncryption::new(self.clone(), bucket)
    }

    /// Creates a PutBucketEncryption request builder for the given
    /// configuration XML.
    pub fn put_bucket_encryption(&self, bucket: &str, config: String) -> PutBucketEncryption {
        PutBucketEncryption::new(self.clone(), bucket, config)
    }

    /// Creates a DeleteBucketEncryption request builder.
    pub fn delete_bucket_encryption(&self, bucket: &str) -> DeleteBucketEncryption {
        DeleteBucketEncryption::new(self.clone(), bucket)
    }

    /// Creates a GetBucketNotification request builder.
    pub fn get_bucket_notification(&self, bucket: &str) -> GetBucketNotification {
        GetBucketNotification::new(self.clone(), bucket)
    }

    /// Creates a PutBucketNotification request builder for the given
    /// configuration XML.
    pub fn put_bucket_notification(&self, bucket: &str, config: String) -> PutBucketNotification {
        PutBucketNotification::new(self.clone(), bucket, config)
    }

    /// Creates a builder that removes all notification configuration.
    pub fn delete_bucket_notification(&self, bucket: &str) -> DeleteBucketNotification {
        DeleteBucketNotification::new(self.clone(), bucket)
    }

    /// Creates a GetObjectLockConfiguration request builder.
    pub fn get_object_lock_config(&self, bucket: &str) -> GetObjectLockConfig {
        GetObjectLockConfig::new(self.clone(), bucket)
    }

    /// Creates a PutObjectLockConfiguration request builder for the given
    /// configuration XML.
    pub fn set_object_lock_config(&self, bucket: &str, config: String) -> SetObjectLockConfig {
        SetObjectLockConfig::new(self.clone(), bucket, config)
    }

    /// Creates a builder that clears the bucket's default object-lock rule.
    pub fn delete_object_lock_config(&self, bucket: &str) -> DeleteObjectLockConfig {
        DeleteObjectLockConfig::new(self.clone(), bucket)
    }
}
