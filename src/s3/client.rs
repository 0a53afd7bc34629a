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

//! S3 client to perform bucket and object operations

use bytes::Bytes;
use dashmap::DashMap;
use http::{HeaderMap, Method};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::s3::aws_chunked::{CHUNK_SIZE, signed_chunk_stream, signed_encoded_length};
use crate::s3::creds::Provider;
use crate::s3::error::{Error, ErrorCode, ErrorResponse};
use crate::s3::header_constants::*;
use crate::s3::http::BaseUrl;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::signer::{chunk_signing_context, sign_v4_s3};
use crate::s3::utils::{EMPTY_SHA256, md5sum_hash_sb, sha256_hash_sb, to_amz_date, utc_now};

mod bucket_config;
mod buckets;
mod get_region;
mod list_objects;
mod listen;
mod multipart;
mod objects;
mod presign;
mod select;

use crate::s3::types::Body;

/// The default AWS region to be used if no other region is specified.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Minimum allowed size (in bytes) for a multipart upload part, except the
/// last one.
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024; // 5 MiB

/// Maximum allowed size (in bytes) for a single upload part or plain PUT.
pub const MAX_PART_SIZE: u64 = 1024 * MIN_PART_SIZE; // 5 GiB

/// Maximum allowed size (in bytes) of an object.
pub const MAX_OBJECT_SIZE: u64 = 1024 * MAX_PART_SIZE; // 5 TiB

/// Maximum number of parts in a multipart upload.
pub const MAX_MULTIPART_COUNT: u16 = 10_000;

/// Maximum (and default) expiry of a presigned URL, in seconds.
pub const DEFAULT_EXPIRY_SECONDS: u32 = 604_800; // 7 days

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Manufactures a [`Client`] from a base URL plus optional credentials,
/// application info, TLS settings and timeouts.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: BaseUrl,
    provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
    app_info: Option<(String, String)>,
    connect_timeout: Duration,
    read_timeout: Duration,
    ssl_cert_file: Option<PathBuf>,
    ignore_cert_check: bool,
}

impl ClientBuilder {
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            provider: None,
            app_info: None,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            ssl_cert_file: None,
            ignore_cert_check: false,
        }
    }

    /// Set the credential provider. Without one the client performs all
    /// operations anonymously.
    pub fn provider<P: Provider + Send + Sync + 'static>(mut self, provider: Option<P>) -> Self {
        self.provider = provider.map(|p| Arc::new(p) as Arc<dyn Provider + Send + Sync + 'static>);
        self
    }

    /// Set the application name/version pair appended to the User-Agent.
    pub fn app_info(mut self, app_info: Option<(String, String)>) -> Self {
        self.app_info = app_info;
        self
    }

    /// Set the connect timeout. Applies to requests issued after the client
    /// is built.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout. Applies to requests issued after the client is
    /// built.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set a PEM bundle of additional CA certificates to trust.
    pub fn ssl_cert_file(mut self, ssl_cert_file: Option<&Path>) -> Self {
        self.ssl_cert_file = ssl_cert_file.map(PathBuf::from);
        self
    }

    /// Skip certificate validation. Insecure; only for testing.
    pub fn ignore_cert_check(mut self, ignore_cert_check: bool) -> Self {
        self.ignore_cert_check = ignore_cert_check;
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        // Transparent response decompression would corrupt payload hashes
        // and resumable-download offsets.
        let mut builder = reqwest::Client::builder()
            .no_gzip()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout);

        let mut user_agent = String::from("Ostor (")
            + std::env::consts::OS
            + "; "
            + std::env::consts::ARCH
            + ") ostor-rs/"
            + env!("CARGO_PKG_VERSION");
        if let Some((app_name, app_version)) = self.app_info {
            user_agent.push_str(format!(" {app_name}/{app_version}").as_str());
        }
        builder = builder.user_agent(user_agent);

        #[cfg(any(
            feature = "default-tls",
            feature = "native-tls",
            feature = "rustls-tls"
        ))]
        {
            if self.ignore_cert_check {
                builder = builder.danger_accept_invalid_certs(true);
            }

            if let Some(v) = self.ssl_cert_file {
                let buf = std::fs::read(v)?;
                let certs = reqwest::Certificate::from_pem_bundle(&buf)
                    .map_err(|e| Error::argument(format!("invalid CA bundle: {e}")))?;
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
        }

        Ok(Client {
            http_client: builder
                .build()
                .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?,
            shared: Arc::new(SharedClientItems {
                base_url: self.base_url,
                provider: self.provider,
                region_map: Default::default(),
            }),
        })
    }
}

/// Simple Storage Service (aka S3) client to perform bucket and object
/// operations.
///
/// If a credential provider is configured, all requests are signed with AWS
/// Signature Version 4; otherwise they are performed anonymously. Cloning is
/// cheap: clones share the HTTP connection pool and the region cache.
#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    pub(crate) shared: Arc<SharedClientItems>,
}

#[derive(Debug)]
pub(crate) struct SharedClientItems {
    pub(crate) base_url: BaseUrl,
    pub(crate) provider: Option<Arc<dyn Provider + Send + Sync + 'static>>,
    pub(crate) region_map: DashMap<String, String>,
}

impl Client {
    /// Returns an S3 client for the given base URL.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ostor::s3::client::Client;
    /// use ostor::s3::creds::StaticProvider;
    /// use ostor::s3::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "storage.example.com".parse().unwrap();
    /// let provider = StaticProvider::new("ACCESSKEY", "SECRETKEY", None);
    /// let client = Client::new(base_url, Some(provider)).unwrap();
    /// ```
    pub fn new<P: Provider + Send + Sync + 'static>(
        base_url: BaseUrl,
        provider: Option<P>,
    ) -> Result<Self, Error> {
        ClientBuilder::new(base_url).provider(provider).build()
    }

    /// Returns whether this client talks to an Amazon AWS host.
    pub fn is_aws_host(&self) -> bool {
        self.shared.base_url.is_aws_host()
    }

    /// Returns whether this client uses HTTPS.
    pub fn is_secure(&self) -> bool {
        self.shared.base_url.https
    }

    /// The region the client was configured with, if any.
    pub(crate) fn configured_region(&self) -> Option<&str> {
        if self.shared.base_url.region.is_empty() {
            None
        } else {
            Some(&self.shared.base_url.region)
        }
    }

    /// Add a bucket-region pair to the region cache if it does not exist.
    pub(crate) fn add_bucket_region(&self, bucket: &str, region: impl Into<String>) {
        self.shared
            .region_map
            .entry(bucket.to_owned())
            .or_insert_with(|| region.into());
    }

    /// Remove a bucket-region pair from the region cache if it exists.
    pub(crate) fn remove_bucket_region(&self, bucket: &str) {
        self.shared.region_map.remove(bucket);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn execute(
        &self,
        method: Method,
        region: &str,
        headers: &mut Multimap,
        query_params: &Multimap,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
        body: Option<Body>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.shared.base_url.build_url(
            &method,
            region,
            query_params,
            bucket_name,
            object_name,
        )?;

        headers.add(HOST, url.host_header_value());
        if (method == Method::PUT || method == Method::POST) && !headers.contains_key(CONTENT_TYPE)
        {
            headers.add(CONTENT_TYPE, "application/octet-stream");
        }

        let creds = self.shared.provider.as_ref().map(|p| p.fetch());

        // Select the payload signing mode and prepare length/hash headers.
        let mut chunked_context = None;
        if let Some(creds) = &creds {
            let content_sha256: String = match &body {
                Some(Body::Stream(_, len)) if method == Method::PUT && !self.is_secure() => {
                    // Chunked streaming upload: the body is framed with
                    // chained per-chunk signatures.
                    let encoding = match headers.get(CONTENT_ENCODING) {
                        Some(v) => format!("aws-chunked,{v}"),
                        None => String::from("aws-chunked"),
                    };
                    headers.remove(CONTENT_ENCODING);
                    headers.add(CONTENT_ENCODING, encoding);
                    headers.add(X_AMZ_DECODED_CONTENT_LENGTH, len.to_string());
                    headers.add(
                        CONTENT_LENGTH,
                        signed_encoded_length(*len, CHUNK_SIZE as u64).to_string(),
                    );
                    "STREAMING-AWS4-HMAC-SHA256-PAYLOAD".into()
                }
                Some(Body::Stream(_, len)) => {
                    headers.add(CONTENT_LENGTH, len.to_string());
                    "UNSIGNED-PAYLOAD".into()
                }
                Some(Body::Data(sb)) => {
                    headers.add(CONTENT_LENGTH, sb.len().to_string());
                    if self.is_secure() {
                        if !headers.contains_key(CONTENT_MD5) {
                            headers.add(CONTENT_MD5, md5sum_hash_sb(sb));
                        }
                        "UNSIGNED-PAYLOAD".into()
                    } else {
                        sha256_hash_sb(sb)
                    }
                }
                None => EMPTY_SHA256.into(),
            };
            headers.add(X_AMZ_CONTENT_SHA256, content_sha256.clone());

            let date = utc_now();
            headers.add(X_AMZ_DATE, to_amz_date(date));
            if let Some(token) = &creds.session_token {
                headers.add(X_AMZ_SECURITY_TOKEN, token.clone());
            }

            let seed_signature = sign_v4_s3(
                &method,
                &url.path,
                region,
                headers,
                query_params,
                &creds.access_key,
                &creds.secret_key,
                &content_sha256,
                date,
            );

            if content_sha256 == "STREAMING-AWS4-HMAC-SHA256-PAYLOAD" {
                chunked_context = Some(chunk_signing_context(
                    &creds.secret_key,
                    date,
                    region,
                    seed_signature,
                ));
            }
        } else {
            // Anonymous mode: no signing, no payload hash.
            match &body {
                Some(Body::Data(sb)) => {
                    headers.add(CONTENT_LENGTH, sb.len().to_string());
                    if !headers.contains_key(CONTENT_MD5) {
                        headers.add(CONTENT_MD5, md5sum_hash_sb(sb));
                    }
                }
                Some(Body::Stream(_, len)) => headers.add(CONTENT_LENGTH, len.to_string()),
                None => {}
            }
        }

        let mut req = self.http_client.request(method.clone(), url.to_string());
        for (key, values) in headers.iter_all() {
            for value in values {
                req = req.header(key, value);
            }
        }

        match body {
            None => {}
            Some(Body::Data(sb)) => {
                let segments: Vec<Bytes> = sb.iter().collect();
                let stream = futures_util::stream::iter(
                    segments
                        .into_iter()
                        .map(|b| -> Result<_, std::io::Error> { Ok(b) }),
                );
                req = req.body(reqwest::Body::wrap_stream(stream));
            }
            Some(Body::Stream(content, _)) => match chunked_context {
                Some(context) => {
                    req = req.body(reqwest::Body::wrap_stream(signed_chunk_stream(
                        content, context,
                    )));
                }
                None => {
                    req = req.body(reqwest::Body::wrap_stream(content.into_stream()));
                }
            },
        }

        let resp = req.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let mut resp = resp;
        let status_code = resp.status().as_u16();
        let resp_headers: HeaderMap = mem::take(resp.headers_mut());
        let resp_body: Bytes = resp.bytes().await?;

        let err = create_error_response(
            status_code,
            &resp_headers,
            resp_body,
            &url.path,
            bucket_name,
            object_name,
        )?;

        // A vanished bucket invalidates its region cache entry.
        if err.code() == Some(&ErrorCode::NoSuchBucket) {
            if let Some(bucket) = bucket_name {
                log::debug!("invalidating cached region of bucket {bucket}");
                self.remove_bucket_region(bucket);
            }
        }

        Err(err)
    }
}

fn header_str(headers: &HeaderMap, key: &str) -> String {
    headers
        .get(key)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Turns a non-2xx response into a typed error: either the parsed XML error
/// document or a code synthesized from the bare status.
fn create_error_response(
    status_code: u16,
    headers: &HeaderMap,
    body: Bytes,
    resource: &str,
    bucket_name: Option<&str>,
    object_name: Option<&str>,
) -> Result<Error, Error> {
    if !body.is_empty() {
        let content_type = header_str(headers, "content-type");
        if !content_type.to_lowercase().contains("application/xml") {
            return Ok(Error::invalid_response(status_code, &content_type));
        }

        let mut resp = ErrorResponse::parse(body)?;
        let code = ErrorCode::parse(&resp.code);
        if resp.bucket_name.is_empty() {
            resp.bucket_name = bucket_name.unwrap_or_default().to_string();
        }
        if resp.object_name.is_empty() {
            resp.object_name = object_name.unwrap_or_default().to_string();
        }
        return Ok(Error::s3_server(code, resp));
    }

    let (code, message) = match status_code {
        301 | 307 => {
            let mut message = String::from("server redirected the request");
            let region = header_str(headers, "x-amz-bucket-region");
            if !region.is_empty() {
                message.push_str("; use region ");
                message.push_str(&region);
            }
            (ErrorCode::Redirect, message)
        }
        400 => (ErrorCode::InvalidUri, "request URI is invalid".into()),
        403 => (ErrorCode::AccessDenied, "access denied".into()),
        404 => match (object_name, bucket_name) {
            (Some(_), _) => (ErrorCode::NoSuchKey, "object does not exist".into()),
            (None, Some(_)) => (ErrorCode::NoSuchBucket, "bucket does not exist".into()),
            (None, None) => (
                ErrorCode::ResourceNotFound,
                "requested resource not found".into(),
            ),
        },
        405 | 501 => (
            ErrorCode::MethodNotAllowed,
            "the specified method is not allowed against this resource".into(),
        ),
        409 => match bucket_name {
            Some(_) => (ErrorCode::NoSuchBucket, "bucket does not exist".into()),
            None => (ErrorCode::ResourceConflict, "request conflicts".into()),
        },
        _ => {
            return Ok(Error::protocol(format!(
                "server failed with unexpected HTTP status code {status_code}"
            )));
        }
    };

    Ok(Error::s3_server(
        code,
        ErrorResponse {
            code: String::new(),
            message,
            resource: resource.to_string(),
            request_id: header_str(headers, "x-amz-request-id"),
            host_id: header_str(headers, "x-amz-id-2"),
            bucket_name: bucket_name.unwrap_or_default().to_string(),
            object_name: object_name.unwrap_or_default().to_string(),
        },
    ))
}
