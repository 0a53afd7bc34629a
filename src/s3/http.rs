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

//! HTTP URL definitions

use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::utils::{match_hostname, url_encode, url_encode_object_key};
use http::Method;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const AWS_S3_PREFIX: &str = r"^(s3(-[a-z_\d]+)*\.)";

lazy_static! {
    static ref AWS_S3_PREFIX_REGEX: Regex = Regex::new(AWS_S3_PREFIX).unwrap();
    static ref AWS_ENDPOINT_REGEX: Regex = Regex::new(r".*\.amazonaws\.com(|\.cn)$").unwrap();
    static ref AWS_S3_ENDPOINT_REGEX: Regex =
        Regex::new(&(AWS_S3_PREFIX.to_string() + r"([a-z_\d-]{1,63}\.)*amazonaws\.com(|\.cn)$"))
            .unwrap();
}

/// Represents a fully constructed HTTP URL
#[derive(Clone, Debug, Default)]
pub struct Url {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Multimap,
}

impl Url {
    /// The `Host` header value: port omitted when it is the scheme default.
    pub fn host_header_value(&self) -> String {
        if self.port > 0 {
            return format!("{}:{}", self.host, self.port);
        }
        self.host.clone()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.host.is_empty() {
            return Err(std::fmt::Error);
        }

        if self.https {
            f.write_str("https://")?;
        } else {
            f.write_str("http://")?;
        }

        if self.port > 0 {
            write!(f, "{}:{}", self.host, self.port)?;
        } else {
            f.write_str(&self.host)?;
        }

        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;

        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&self.query.to_query_string())?;
        }

        Ok(())
    }
}

/// Checks whether the host belongs to Amazon AWS
pub fn match_aws_endpoint(value: &str) -> bool {
    AWS_ENDPOINT_REGEX.is_match(value.to_lowercase().as_str())
}

/// Checks whether the host is a valid Amazon S3 endpoint
pub fn match_aws_s3_endpoint(value: &str) -> bool {
    AWS_S3_ENDPOINT_REGEX.is_match(value.to_lowercase().as_str())
}

#[derive(Clone, Debug, Default)]
struct AwsHostInfo {
    region: String,
    s3_prefix: String,
    domain_suffix: String,
    dualstack: bool,
}

/// Extracts region/prefix/suffix information from an Amazon S3 host, e.g.
/// `s3.dualstack.eu-west-1.amazonaws.com`. Returns `None` for non-AWS
/// hosts.
fn get_aws_info(host: &str) -> Result<Option<AwsHostInfo>, Error> {
    if !match_hostname(host) || !match_aws_endpoint(host) {
        return Ok(None);
    }

    if !match_aws_s3_endpoint(host) {
        return Err(Error::argument(format!("invalid Amazon AWS host {host}")));
    }

    let matched = AWS_S3_PREFIX_REGEX.find(host).unwrap();
    let s3_prefix = &host[..matched.end()];

    let mut tokens: Vec<&str> = host[matched.end()..].split('.').collect();
    let dualstack = tokens.first() == Some(&"dualstack");
    if dualstack {
        tokens.remove(0);
    }

    let mut region = String::new();
    if tokens.first() != Some(&"amazonaws") {
        region = tokens.remove(0).to_string();
    }

    Ok(Some(AwsHostInfo {
        region,
        s3_prefix: s3_prefix.to_string(),
        domain_suffix: tokens.join("."),
        dualstack,
    }))
}

/// Represents the base URL of an S3 endpoint
#[derive(Clone, Debug)]
pub struct BaseUrl {
    pub https: bool,
    host: String,
    port: u16,
    pub region: String,
    aws_s3_prefix: String,
    aws_domain_suffix: String,
    pub dualstack: bool,
    pub virtual_style: bool,
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self {
            https: true,
            host: String::new(),
            port: 0,
            region: String::new(),
            aws_s3_prefix: String::new(),
            aws_domain_suffix: String::new(),
            dualstack: false,
            virtual_style: false,
        }
    }
}

impl BaseUrl {
    /// Checks whether this base URL points at Amazon AWS
    pub fn is_aws_host(&self) -> bool {
        !self.aws_domain_suffix.is_empty()
    }

    fn build_aws_host(&self, bucket_name: &str, region: &str) -> Result<String, Error> {
        let mut host = String::from(&self.aws_s3_prefix);

        if self.aws_s3_prefix.contains("s3-accelerate") {
            if bucket_name.contains('.') {
                return Err(Error::argument(
                    "bucket name with '.' is not allowed for accelerate endpoint",
                ));
            }
        } else {
            if self.dualstack {
                host.push_str("dualstack.");
            }
            host.push_str(region);
            host.push('.');
        }

        host.push_str(&self.aws_domain_suffix);
        Ok(host)
    }

    fn build_list_buckets_host(&self, region: &str) -> String {
        let mut suffix = String::from("amazonaws.com");
        if self.aws_domain_suffix.ends_with(".cn") {
            suffix.push_str(".cn");
        }
        format!("s3.{region}.{suffix}")
    }

    /// Builds the URL of an S3 operation for the given parameters.
    ///
    /// Virtual-hosted style is used when enabled for this endpoint, except
    /// for the cases that force path style: bucket creation (PUT with
    /// neither object nor query), location discovery, and dotted bucket
    /// names over HTTPS.
    pub fn build_url(
        &self,
        method: &Method,
        region: &str,
        query: &Multimap,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
    ) -> Result<Url, Error> {
        if object_name.is_some_and(|v| !v.is_empty()) && bucket_name.map_or(true, |v| v.is_empty())
        {
            return Err(Error::argument("empty bucket name provided for object name"));
        }

        let mut url = Url {
            https: self.https,
            host: self.host.clone(),
            port: self.port,
            path: String::from("/"),
            query: query.clone(),
        };

        let Some(bucket) = bucket_name else {
            if !self.aws_domain_suffix.is_empty() {
                url.host = self.build_list_buckets_host(region);
            }
            return Ok(url);
        };

        let enforce_path_style =
	    // CreateBucket API requires path style in Amazon AWS S3.
	    (*method == Method::PUT && object_name.is_none() && query.is_empty()) ||
	    // GetBucketLocation API requires path style in Amazon AWS S3.
	    query.contains_key("location") ||
	    // A '.' in the bucket name breaks TLS certificate validation
	    // against the wildcard certificate in virtual-hosted style.
	    (bucket.contains('.') && self.https);

        if !self.aws_domain_suffix.is_empty() {
            url.host = self.build_aws_host(bucket, region)?;
        }

        let mut host = url.host.clone();
        let mut path = String::new();

        if enforce_path_style || !self.virtual_style {
            path.push('/');
            path.push_str(&url_encode(bucket));
        } else {
            host = format!("{}.{}", bucket, url.host);
        }

        if let Some(v) = object_name {
            if !v.starts_with('/') {
                path.push('/');
            }
            path.push_str(&url_encode_object_key(v));
        }

        url.host = host;
        url.path = path;

        Ok(url)
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    /// Parses a base URL from a host name, `host:port` pair or an
    /// `http(s)://` URL with an empty path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let padded: String;
        let value = if s.contains("://") {
            s
        } else {
            padded = format!("https://{s}");
            &padded
        };

        let url = url::Url::parse(value)
            .map_err(|e| Error::argument(format!("invalid base URL: {e}")))?;

        let https = match url.scheme() {
            "http" => false,
            "https" => true,
            _ => return Err(Error::argument("scheme must be http or https")),
        };

        let host = url
            .host_str()
            .ok_or_else(|| Error::argument("valid host must be provided"))?;

        // The explicit port; zero when absent or the scheme default.
        let port = url.port().unwrap_or(0);

        if !url.path().is_empty() && url.path() != "/" {
            return Err(Error::argument("path must be empty for base URL"));
        }

        if url.query().is_some() {
            return Err(Error::argument("query must be none for base URL"));
        }

        let aws_info = get_aws_info(host)?;
        let virtual_style = aws_info.is_some();
        let info = aws_info.unwrap_or_default();

        Ok(BaseUrl {
            https,
            host: host.to_string(),
            port,
            region: info.region,
            aws_s3_prefix: info.s3_prefix,
            aws_domain_suffix: info.domain_suffix,
            dualstack: info.dualstack,
            virtual_style,
        })
    }
}
