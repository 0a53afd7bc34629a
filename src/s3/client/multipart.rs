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

//! Low-level multipart upload operations.

use super::Client;
use crate::s3::builders::{
    AbortMultipartUpload, CompleteMultipartUpload, CreateMultipartUpload, ListMultipartUploads,
    ListParts, SegmentedBytes, UploadPart, UploadPartCopy,
};
use crate::s3::types::Part;

impl Client {
    /// Creates a CreateMultipartUpload request builder.
    pub fn create_multipart_upload(&self, bucket: &str, object: &str) -> CreateMultipartUpload {
        CreateMultipartUpload::new(self.clone(), bucket, object)
    }

    /// Creates an UploadPart request builder.
    pub fn upload_part(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: SegmentedBytes,
    ) -> UploadPart {
        UploadPart::new(self.clone(), bucket, object, upload_id, part_number, data)
    }

    /// Creates an UploadPartCopy request builder.
    pub fn upload_part_copy(&self, bucket: &str, object: &str) -> UploadPartCopy {
        UploadPartCopy::new(self.clone(), bucket, object)
    }

    /// Creates a CompleteMultipartUpload request builder. Parts are
    /// submitted in ascending part-number order.
    pub fn complete_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        parts: Vec<Part>,
    ) -> CompleteMultipartUpload {
        CompleteMultipartUpload::new(self.clone(), bucket, object, upload_id, parts)
    }

    /// Creates an AbortMultipartUpload request builder.
    pub fn abort_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
    ) -> AbortMultipartUpload {
        AbortMultipartUpload::new(self.clone(), bucket, object, upload_id)
    }

    /// Creates a ListMultipartUploads request builder.
    pub fn list_multipart_uploads(&self, bucket: &str) -> ListMultipartUploads {
        ListMultipartUploads::new(self.clone(), bucket)
    }

    /// Creates a ListParts request builder.
    pub fn list_parts(&self, bucket: &str, object: &str, upload_id: &str) -> ListParts {
        ListParts::new(self.clone(), bucket, object, upload_id)
    }
}
