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

use crate::s3::client::Client;
use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::response::ListenBucketNotificationResponse;
use crate::s3::types::{NotificationRecords, S3Api, S3Request, ToS3Request};
use crate::s3::utils::check_bucket_name;
use futures_util::Stream;
use http::Method;

/// Argument builder for the long-poll bucket notification listen API.
///
/// The response is a lazy stream of notification records; dropping the
/// stream releases the connection.
pub struct ListenBucketNotification {
    client: Client,

    extra_headers: Option<Multimap>,
    extra_query_params: Option<Multimap>,
    region: Option<String>,
    bucket: String,
    prefix: Option<String>,
    suffix: Option<String>,
    events: Option<Vec<String>>,
}

impl ListenBucketNotification {
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            extra_headers: None,
            extra_query_params: None,
            region: None,
            bucket: bucket.to_string(),
            prefix: None,
            suffix: None,
            events: None,
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

    /// Listen only for objects whose key starts with this prefix.
    pub fn prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Listen only for objects whose key ends with this suffix.
    pub fn suffix(mut self, suffix: Option<String>) -> Self {
        self.suffix = suffix;
        self
    }

    /// Event names to listen for, e.g. `s3:ObjectCreated:*`.
    pub fn events(mut self, events: Option<Vec<String>>) -> Self {
        self.events = events;
        self
    }
}

impl S3Api for ListenBucketNotification {
    type S3Response = (
        ListenBucketNotificationResponse,
        Box<dyn Stream<Item = Result<NotificationRecords, Error>> + Unpin + Send>,
    );
}

impl ToS3Request for ListenBucketNotification {
    fn to_s3request(self) -> Result<S3Request, Error> {
        check_bucket_name(&self.bucket)?;

        let mut query_params = self.extra_query_params.unwrap_or_default();
        query_params.add("notification", "");
        query_params.add("prefix", self.prefix.unwrap_or_default());
        query_params.add("suffix", self.suffix.unwrap_or_default());
        if let Some(events) = self.events {
            for event in events {
                query_params.add("events", event);
            }
        } else {
            query_params.add("events", "s3:ObjectCreated:*");
            query_params.add("events", "s3:ObjectRemoved:*");
            query_params.add("events", "s3:ObjectAccessed:*");
        }

        Ok(S3Request::new(self.client, Method::GET)
            .region(self.region)
            .bucket(Some(self.bucket))
            .query_params(query_params)
            .headers(self.extra_headers.unwrap_or_default()))
    }
}
