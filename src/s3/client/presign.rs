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

use super::Client;
use crate::s3::builders::{GetPresignedObjectUrl, GetPresignedPostFormData, PostPolicy};
use http::Method;

impl Client {
    /// Creates a builder computing a presigned URL for the given method and
    /// object.
    pub fn get_presigned_object_url(
        &self,
        bucket: &str,
        object: &str,
        method: Method,
    ) -> GetPresignedObjectUrl {
        GetPresignedObjectUrl::new(self.clone(), bucket, object, method)
    }

    /// Creates a builder computing presigned POST form data for the given
    /// policy.
    pub fn get_presigned_post_form_data(&self, policy: PostPolicy) -> GetPresignedPostFormData {
        GetPresignedPostFormData::new(self.clone(), policy)
    }
}
