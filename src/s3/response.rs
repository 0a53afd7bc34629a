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

//! Typed responses of all S3 API operations.

mod bucket_config;
mod buckets;
mod copy_object;
mod delete_objects;
mod get_object;
mod get_presigned_object_url;
mod get_region;
mod list_multipart;
pub mod list_objects;
mod listen_bucket_notification;
mod object_retention;
mod put_object;
mod select_object_content;
mod stat_object;

pub use bucket_config::*;
pub use buckets::*;
pub use copy_object::*;
pub use delete_objects::*;
pub use get_object::*;
pub use get_presigned_object_url::*;
pub use get_region::*;
pub use list_multipart::*;
pub use list_objects::{ListObjectsResponse, ListObjectsV1Response, ListObjectsV2Response};
pub use listen_bucket_notification::*;
pub use object_retention::*;
pub use put_object::*;
pub use select_object_content::*;
pub use stat_object::*;
