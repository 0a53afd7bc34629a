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

//! Bucket-level operations.

use super::Client;
use crate::s3::builders::{BucketExists, CreateBucket, DeleteBucket, ListBuckets};

impl Client {
    /// Creates a CreateBucket request builder.
    pub fn create_bucket(&self, bucket: &str) -> CreateBucket {
        CreateBucket::new(self.clone(), bucket)
    }

    /// Creates a DeleteBucket request builder.
    pub fn delete_bucket(&self, bucket: &str) -> DeleteBucket {
        DeleteBucket::new(self.clone(), bucket)
    }

    /// Creates a HeadBucket request builder.
    pub fn bucket_exists(&self, bucket: &str) -> BucketExists {
        BucketExists::new(self.clone(), bucket)
    }

    /// Creates a ListBuckets request builder.
    pub fn list_buckets(&self) -> ListBuckets {
        ListBuckets::new(self.clone())
    }
}
