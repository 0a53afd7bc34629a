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

//! Server side encryption definitions

use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::utils::{b64_encode, md5sum_hash};
use std::any::Any;

/// Base server side encryption
pub trait Sse: std::fmt::Debug + Send + Sync {
    /// Regular headers
    fn headers(&self) -> Multimap;
    /// Headers for copy operation
    fn copy_headers(&self) -> Multimap;
    fn tls_required(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

/// Server side encryption with a customer supplied key (SSE-C). The key
/// travels with every request, so TLS is mandatory.
#[derive(Clone, Debug)]
pub struct SseCustomerKey {
    headers: Multimap,
    copy_headers: Multimap,
}

impl SseCustomerKey {
    pub fn new(key: &str) -> Self {
        let b64key = b64_encode(key);
        let md5key = md5sum_hash(key.as_bytes());

        let mut headers = Multimap::new();
        headers.add("X-Amz-Server-Side-Encryption-Customer-Algorithm", "AES256");
        headers.add("X-Amz-Server-Side-Encryption-Customer-Key", b64key.clone());
        headers.add(
            "X-Amz-Server-Side-Encryption-Customer-Key-MD5",
            md5key.clone(),
        );

        let mut copy_headers = Multimap::new();
        copy_headers.add(
            "X-Amz-Copy-Source-Server-Side-Encryption-Customer-Algorithm",
            "AES256",
        );
        copy_headers.add(
            "X-Amz-Copy-Source-Server-Side-Encryption-Customer-Key",
            b64key,
        );
        copy_headers.add(
            "X-Amz-Copy-Source-Server-Side-Encryption-Customer-Key-MD5",
            md5key,
        );

        Self {
            headers,
            copy_headers,
        }
    }
}

impl Sse for SseCustomerKey {
    fn headers(&self) -> Multimap {
        self.headers.clone()
    }

    fn copy_headers(&self) -> Multimap {
        self.copy_headers.clone()
    }

    fn tls_required(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Server side encryption with AWS KMS managed keys (SSE-KMS)
#[derive(Clone, Debug)]
pub struct SseKms {
    headers: Multimap,
}

impl SseKms {
    pub fn new(key: &str, context: Option<&str>) -> SseKms {
        let mut headers = Multimap::new();
        headers.add("X-Amz-Server-Side-Encryption-Aws-Kms-Key-Id", key);
        headers.add("X-Amz-Server-Side-Encryption", "aws:kms");
        if let Some(v) = context {
            headers.add("X-Amz-Server-Side-Encryption-Context", b64_encode(v));
        }

        SseKms { headers }
    }
}

impl Sse for SseKms {
    fn headers(&self) -> Multimap {
        self.headers.clone()
    }

    fn copy_headers(&self) -> Multimap {
        Multimap::new()
    }

    fn tls_required(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Server side encryption with S3 managed keys (SSE-S3)
#[derive(Clone, Debug)]
pub struct SseS3 {
    headers: Multimap,
}

impl SseS3 {
    pub fn new() -> Self {
        let mut headers = Multimap::new();
        headers.add("X-Amz-Server-Side-Encryption", "AES256");
        Self { headers }
    }
}

impl Default for SseS3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sse for SseS3 {
    fn headers(&self) -> Multimap {
        self.headers.clone()
    }

    fn copy_headers(&self) -> Multimap {
        Multimap::new()
    }

    fn tls_required(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
