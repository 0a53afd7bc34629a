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

//! Bucket region resolution and its process-wide cache.

use super::{Client, DEFAULT_REGION};
use crate::s3::builders::GetRegion;
use crate::s3::error::Error;
use crate::s3::types::S3Api;

impl Client {
    /// Creates a GetBucketLocation request builder.
    pub fn get_region(&self, bucket: &str) -> GetRegion {
        GetRegion::new(self.clone(), bucket)
    }

    /// Returns the bucket's region: the caller- or client-configured region
    /// when set, otherwise the cached discovery result, otherwise a fresh
    /// `GET /?location` whose result is cached.
    pub async fn get_region_cached(
        &self,
        bucket: &str,
        region: Option<&str>,
    ) -> Result<String, Error> {
        if let Some(region) = region.filter(|v| !v.is_empty()) {
            if let Some(configured) = self.configured_region() {
                if configured != region {
                    return Err(Error::argument(format!(
                        "region must be {configured}, but passed {region}"
                    )));
                }
            }
            return Ok(region.to_string());
        }

        if let Some(configured) = self.configured_region() {
            return Ok(configured.to_string());
        }

        // Anonymous clients cannot sign the location call; assume the
        // default region.
        if bucket.is_empty() || self.shared.provider.is_none() {
            return Ok(DEFAULT_REGION.to_string());
        }

        if let Some(v) = self.shared.region_map.get(bucket) {
            return Ok(v.value().clone());
        }

        let location = self.get_region(bucket).send().await?.region_response;
        self.shared
            .region_map
            .insert(bucket.to_string(), location.clone());
        Ok(location)
    }
}
