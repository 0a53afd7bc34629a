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

//! Tests of endpoint parsing and URL construction rules.

use super::http::BaseUrl;
use super::multimap::{Multimap, MultimapExt};
use http::Method;

fn aws_url() -> BaseUrl {
    "s3.amazonaws.com".parse().unwrap()
}

#[test]
fn base_url_from_host_defaults_to_https() {
    let base_url: BaseUrl = "play.min.io".parse().unwrap();
    assert!(base_url.https);
    assert!(!base_url.is_aws_host());
}

#[test]
fn base_url_parses_scheme_host_and_port() {
    let base_url: BaseUrl = "http://192.168.124.63:9000".parse().unwrap();
    assert!(!base_url.https);

    let url = base_url
        .build_url(&Method::GET, "us-east-1", &Multimap::new(), Some("abc"), None)
        .unwrap();
    assert_eq!(url.to_string(), "http://192.168.124.63:9000/abc");
    assert_eq!(url.host_header_value(), "192.168.124.63:9000");
}

#[test]
fn base_url_default_port_is_elided() {
    let base_url: BaseUrl = "https://play.min.io:443".parse().unwrap();
    let url = base_url
        .build_url(&Method::GET, "us-east-1", &Multimap::new(), Some("abc"), None)
        .unwrap();
    assert_eq!(url.host_header_value(), "play.min.io");
}

#[test]
fn base_url_rejects_path_query_and_bad_scheme() {
    assert!("https://play.min.io/prefix".parse::<BaseUrl>().is_err());
    assert!("https://play.min.io/?x=1".parse::<BaseUrl>().is_err());
    assert!("ftp://play.min.io".parse::<BaseUrl>().is_err());
}

#[test]
fn base_url_parses_ipv6() {
    let base_url: BaseUrl = "[2001:db8::1]:9000".parse().unwrap();
    let url = base_url
        .build_url(&Method::GET, "us-east-1", &Multimap::new(), Some("abc"), None)
        .unwrap();
    assert_eq!(url.to_string(), "https://[2001:db8::1]:9000/abc");
}

#[test]
fn aws_virtual_hosted_style_selects_regional_endpoint() {
    let url = aws_url()
        .build_url(
            &Method::GET,
            "eu-west-1",
            &Multimap::new(),
            Some("ab"),
            Some("key"),
        )
        .unwrap();
    assert_eq!(url.to_string(), "https://ab.s3.eu-west-1.amazonaws.com/key");
}

#[test]
fn dotted_bucket_over_https_forces_path_style() {
    let url = aws_url()
        .build_url(
            &Method::GET,
            "us-east-1",
            &Multimap::new(),
            Some("a.b"),
            Some("key"),
        )
        .unwrap();
    assert_eq!(url.to_string(), "https://s3.us-east-1.amazonaws.com/a.b/key");
}

#[test]
fn create_bucket_forces_path_style() {
    // PUT with neither object nor query is bucket creation.
    let url = aws_url()
        .build_url(&Method::PUT, "us-east-1", &Multimap::new(), Some("ab"), None)
        .unwrap();
    assert_eq!(url.to_string(), "https://s3.us-east-1.amazonaws.com/ab");
}

#[test]
fn location_query_forces_path_style() {
    let mut query = Multimap::new();
    query.add("location", "");

    let url = aws_url()
        .build_url(&Method::GET, "us-east-1", &query, Some("ab"), None)
        .unwrap();
    assert_eq!(
        url.to_string(),
        "https://s3.us-east-1.amazonaws.com/ab?location="
    );
}

#[test]
fn non_aws_hosts_default_to_path_style() {
    let base_url: BaseUrl = "play.min.io".parse().unwrap();
    let url = base_url
        .build_url(
            &Method::GET,
            "us-east-1",
            &Multimap::new(),
            Some("ab"),
            Some("key"),
        )
        .unwrap();
    assert_eq!(url.to_string(), "https://play.min.io/ab/key");
}

#[test]
fn virtual_style_can_be_enabled_for_custom_hosts() {
    let mut base_url: BaseUrl = "storage.example.com".parse().unwrap();
    base_url.virtual_style = true;

    let url = base_url
        .build_url(
            &Method::GET,
            "us-east-1",
            &Multimap::new(),
            Some("ab"),
            Some("key"),
        )
        .unwrap();
    assert_eq!(url.to_string(), "https://ab.storage.example.com/key");
}

#[test]
fn object_keys_are_percent_encoded_preserving_slashes() {
    let base_url: BaseUrl = "play.min.io".parse().unwrap();
    let url = base_url
        .build_url(
            &Method::GET,
            "us-east-1",
            &Multimap::new(),
            Some("ab"),
            Some("dir one/file+name.txt"),
        )
        .unwrap();
    assert_eq!(
        url.to_string(),
        "https://play.min.io/ab/dir%20one/file%2Bname.txt"
    );
}

#[test]
fn object_without_bucket_is_rejected() {
    let base_url: BaseUrl = "play.min.io".parse().unwrap();
    assert!(
        base_url
            .build_url(&Method::GET, "us-east-1", &Multimap::new(), None, Some("key"))
            .is_err()
    );
}

#[test]
fn dualstack_endpoint_is_preserved() {
    let base_url: BaseUrl = "s3.dualstack.eu-west-1.amazonaws.com".parse().unwrap();
    assert!(base_url.is_aws_host());
    assert_eq!(base_url.region, "eu-west-1");

    let url = base_url
        .build_url(
            &Method::GET,
            "eu-west-1",
            &Multimap::new(),
            Some("ab"),
            Some("key"),
        )
        .unwrap();
    assert_eq!(
        url.to_string(),
        "https://ab.s3.dualstack.eu-west-1.amazonaws.com/key"
    );
}

#[test]
fn list_buckets_uses_regional_endpoint() {
    let url = aws_url()
        .build_url(&Method::GET, "eu-west-1", &Multimap::new(), None, None)
        .unwrap();
    assert_eq!(url.to_string(), "https://s3.eu-west-1.amazonaws.com/");
}
