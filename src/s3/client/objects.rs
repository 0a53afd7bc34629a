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

//! Object-level operations.

use super::Client;
use crate::s3::builders::{
    ComposeObject, ComposeSource, CopyObject, CopySource, DeleteObject, DeleteObjects,
    DownloadObject, GetObject, GetObjectLegalHold, GetObjectRetention, ObjectContent,
    ObjectToDelete, PutObject, PutObjectContent, SegmentedBytes, SetObjectLegalHold,
    SetObjectRetention, StatObject,
};
use crate::s3::types::Retention;
use std::path::Path;

impl Client {
    /// Creates a GetObject request builder.
    pub fn get_object(&self, bucket: &str, object: &str) -> GetObject {
        GetObject::new(self.clone(), bucket, object)
    }

    /// Creates a resumable download of an object to a local file.
    pub fn download_object(&self, bucket: &str, object: &str, filename: &Path) -> DownloadObject {
        DownloadObject::new(self.clone(), bucket, object, filename)
    }

    /// Creates a HeadObject request builder.
    pub fn stat_object(&self, bucket: &str, object: &str) -> StatObject {
        StatObject::new(self.clone(), bucket, object)
    }

    /// Creates a builder uploading the given content, handling multipart
    /// transparently.
    pub fn put_object_content(
        &self,
        bucket: &str,
        object: &str,
        content: impl Into<ObjectContent>,
    ) -> PutObjectContent {
        PutObjectContent::new(self.clone(), bucket, object, content)
    }

    /// Creates a plain single-request PutObject builder.
    pub fn put_object(&self, bucket: &str, object: &str, data: SegmentedBytes) -> PutObject {
        PutObject::new(self.clone(), bucket, object, data)
    }

    /// Creates a DeleteObject request builder.
    pub fn delete_object(&self, bucket: &str, object: &str) -> DeleteObject {
        DeleteObject::new(self.clone(), bucket, object)
    }

    /// Creates a bulk DeleteObjects request builder.
    pub fn delete_objects(&self, bucket: &str, objects: Vec<ObjectToDelete>) -> DeleteObjects {
        DeleteObjects::new(self.clone(), bucket, objects)
    }

    /// Creates a server-side CopyObject builder.
    pub fn copy_object(&self, bucket: &str, object: &str, source: CopySource) -> CopyObject {
        CopyObject::new(self.clone(), bucket, object, source)
    }

    /// Creates a compose builder stitching the given sources into the
    /// destination object via server-side part copies.
    pub fn compose_object(
        &self,
        bucket: &str,
        object: &str,
        sources: Vec<ComposeSource>,
    ) -> ComposeObject {
        ComposeObject::new(self.clone(), bucket, object, sources)
    }

    /// Creates a GetObjectRetention request builder.
    pub fn get_object_retention(&self, bucket: &str, object: &str) -> GetObjectRetention {
        GetObjectRetention::new(self.clone(), bucket, object)
    }

    /// Creates a PutObjectRetention request builder.
    pub fn set_object_retention(
        &self,
        bucket: &str,
        object: &str,
        retention: Option<Retention>,
    ) -> SetObjectRetention {
        SetObjectRetention::new(self.clone(), bucket, object, retention)
    }

    /// Creates a GetObjectLegalHold request builder.
    pub fn get_object_legal_hold(&self, bucket: &str, object: &str) -> GetObjectLegalHold {
        GetObjectLegalHold::new(self.clone(), bucket, object)
    }

    /// Creates a PutObjectLegalHold request builder.
    pub fn set_object_legal_hold(
        &self,
        bucket: &str,
        object: &str,
        legal_hold: bool,
    ) -> SetObjectLegalHold {
        SetObjectLegalHold::new(self.clone(), bucket, object, legal_hold)
    }
}
