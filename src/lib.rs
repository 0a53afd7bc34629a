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

//! Client SDK for Amazon S3 compatible object storage services.
//!
//! The [`s3::client::Client`] type is the entry point: it turns high-level
//! bucket and object operations into signed HTTP exchanges against an
//! S3-compatible endpoint, handles multipart uploads and server-side
//! compose/copy transparently, and exposes paginated listings as lazy
//! streams.

pub mod s3;
