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

//! Various utility and helper functions

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use crc_fast::{CrcAlgorithm, Digest as CrcDigest};
use lazy_static::lazy_static;
use md5::compute as md5compute;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use sha2::{Digest, Sha256};
pub use urlencoding::decode as url_decode;
pub use urlencoding::encode as url_encode;
use xmltree::Element;

use crate::s3::error::Error;
use crate::s3::multimap::{Multimap, MultimapExt};
use crate::s3::segmented_bytes::SegmentedBytes;

/// Date and time with UTC timezone
pub type UtcTime = DateTime<Utc>;

/// Hex encoded SHA-256 of the empty byte string
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Encodes data using base64 algorithm
pub fn b64_encode<T: AsRef<[u8]>>(input: T) -> String {
    BASE64.encode(input)
}

/// Merges two multimaps
pub fn merge(m1: &mut Multimap, m2: &Multimap) {
    for (key, values) in m2.iter_all() {
        for value in values {
            m1.insert(key.to_string(), value.to_string());
        }
    }
}

/// Returns a multimap holding `extra` (if any) plus `key` with an empty value
pub fn insert(extra: Option<Multimap>, key: &str) -> Multimap {
    let mut m = extra.unwrap_or_default();
    m.add(key, "");
    m
}

/// Computes CRC32 (ISO-HDLC) of given data
pub fn crc32(data: &[u8]) -> u32 {
    let mut digest = CrcDigest::new(CrcAlgorithm::Crc32IsoHdlc);
    digest.update(data);
    digest.finalize() as u32
}

/// Reads a big-endian u32 from the head of the slice
pub fn uint32(data: &[u8]) -> Result<u32, Error> {
    let bytes: [u8; 4] = data
        .get(0..4)
        .and_then(|v| v.try_into().ok())
        .ok_or_else(|| Error::protocol("not enough data for a 32-bit value"))?;
    Ok(u32::from_be_bytes(bytes))
}

/// Gets hex encoded SHA256 hash of given data
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Gets hex encoded SHA256 hash of segmented bytes without flattening them
pub fn sha256_hash_sb(sb: &SegmentedBytes) -> String {
    let mut hasher = Sha256::new();
    for data in sb.iter() {
        hasher.update(data);
    }
    hex::encode(hasher.finalize())
}

/// Gets base64 encoded MD5 hash of given data
pub fn md5sum_hash(data: &[u8]) -> String {
    b64_encode(md5compute(data).as_slice())
}

/// Gets base64 encoded MD5 hash of segmented bytes
pub fn md5sum_hash_sb(sb: &SegmentedBytes) -> String {
    let mut hasher = md5::Context::new();
    for data in sb.iter() {
        hasher.consume(data);
    }
    b64_encode(hasher.compute().as_slice())
}

/// Gets current UTC time
pub fn utc_now() -> UtcTime {
    chrono::offset::Utc::now()
}

/// Gets signer date value of given time
pub fn to_signer_date(time: UtcTime) -> String {
    time.format("%Y%m%d").to_string()
}

/// Gets AMZ date value of given time
pub fn to_amz_date(time: UtcTime) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Gets HTTP header value of given time
pub fn to_http_header_value(time: UtcTime) -> String {
    format!(
        "{}, {} {} {} GMT",
        time.weekday(),
        time.day(),
        match time.month() {
            1 => "Jan",
            2 => "Feb",
            3 => "Mar",
            4 => "Apr",
            5 => "May",
            6 => "Jun",
            7 => "Jul",
            8 => "Aug",
            9 => "Sep",
            10 => "Oct",
            11 => "Nov",
            12 => "Dec",
            _ => "",
        },
        time.format("%Y %H:%M:%S")
    )
}

/// Gets ISO8601 UTC formatted value of given time
pub fn to_iso8601utc(time: UtcTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S.%3fZ").to_string()
}

/// Parses ISO8601 UTC formatted value to time
pub fn from_iso8601utc(s: &str) -> Result<UtcTime, Error> {
    let naive = match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S.%3fZ") {
        Ok(d) => d,
        _ => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")?,
    };
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Parses HTTP header value to time
pub fn from_http_header_value(s: &str) -> Result<UtcTime, Error> {
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(
        NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S GMT")?,
        Utc,
    ))
}

pub mod aws_date_format {
    use super::{UtcTime, from_iso8601utc, to_iso8601utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &UtcTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_iso8601utc(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<UtcTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        from_iso8601utc(&s).map_err(serde::de::Error::custom)
    }
}

// Characters that survive percent-encoding of an object key. Everything
// outside RFC 3986 unreserved is escaped, except '/' which delimits key
// segments on the wire.
const OBJECT_KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes an object key, preserving literal `/`
pub fn url_encode_object_key(key: &str) -> String {
    utf8_percent_encode(key, OBJECT_KEY_ENCODE_SET).collect()
}

/// Removes a single pair of surrounding double quotes, as found in ETag
/// header values
pub fn trim_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(s)
}

/// Checks if given hostname is valid or not
pub fn match_hostname(value: &str) -> bool {
    lazy_static! {
        static ref HOSTNAME_REGEX: Regex =
            Regex::new(r"^([a-z_\d-]{1,63}\.)*([a-z_\d-]{1,63})$").unwrap();
    }

    if !HOSTNAME_REGEX.is_match(value.to_lowercase().as_str()) {
        return false;
    }

    for token in value.split('.') {
        if token.starts_with('-')
            || token.starts_with('_')
            || token.ends_with('-')
            || token.ends_with('_')
        {
            return false;
        }
    }

    true
}

/// Validates the given bucket name against the S3 naming rules: 3 to 63
/// characters of lowercase alphanumerics, dots and hyphens, starting and
/// ending alphanumeric, without consecutive dots.
pub fn check_bucket_name(bucket_name: &str) -> Result<(), Error> {
    lazy_static! {
        static ref VALID_BUCKET_NAME_REGEX: Regex =
            Regex::new(r"^[a-z0-9][a-z0-9.\-]+[a-z0-9]$").unwrap();
    }

    if bucket_name.len() < 3 {
        return Err(Error::argument(
            "bucket name cannot be less than 3 characters",
        ));
    }

    if bucket_name.len() > 63 {
        return Err(Error::argument(
            "bucket name cannot be greater than 63 characters",
        ));
    }

    if bucket_name.contains("..") {
        return Err(Error::argument(
            "bucket name cannot contain successive periods",
        ));
    }

    if !VALID_BUCKET_NAME_REGEX.is_match(bucket_name) {
        return Err(Error::argument("bucket name does not follow S3 standards"));
    }

    Ok(())
}

/// Validates the given object key: nonempty, and no `.` or `..` path
/// segments.
pub fn check_object_name(object_name: &str) -> Result<(), Error> {
    if object_name.is_empty() {
        return Err(Error::argument("object name cannot be empty"));
    }

    for segment in object_name.split('/') {
        if segment == "." || segment == ".." {
            return Err(Error::argument(
                "object name cannot contain '.' or '..' path segments",
            ));
        }
    }

    Ok(())
}

lazy_static! {
    // Standard HTTP headers that pass through to the request unchanged.
    static ref STANDARD_HEADERS: HashSet<&'static str> = HashSet::from([
        "cache-control",
        "content-disposition",
        "content-encoding",
        "content-language",
        "content-type",
        "expires",
    ]);

    // Bare AWS header tokens that are rewritten to their x-amz-* form.
    static ref AMZ_TOKEN_HEADERS: HashSet<&'static str> = HashSet::from([
        "acl",
        "grant-full-control",
        "grant-read",
        "grant-read-acp",
        "grant-write-acp",
        "storage-class",
        "tagging",
        "website-redirect-location",
    ]);
}

/// Categorizes caller-supplied headers: recognized standard HTTP headers
/// pass through, recognized AWS tokens become `x-amz-*`, and everything else
/// that is not already `x-amz-` prefixed becomes `x-amz-meta-*` user
/// metadata.
pub fn normalize_user_headers(map: &Multimap) -> Multimap {
    let mut normalized = Multimap::new();
    for (key, values) in map.iter_all() {
        let lower = key.to_lowercase();
        for value in values {
            if STANDARD_HEADERS.contains(lower.as_str()) || lower.starts_with("x-amz-") {
                normalized.add(key.clone(), value.clone());
            } else if AMZ_TOKEN_HEADERS.contains(lower.as_str()) {
                normalized.add(format!("x-amz-{lower}"), value.clone());
            } else {
                normalized.add(format!("x-amz-meta-{lower}"), value.clone());
            }
        }
    }
    normalized
}

/// Gets text value of given XML element for given tag
pub fn get_text(element: &Element, tag: &str) -> Result<String, Error> {
    Ok(element
        .get_child(tag)
        .ok_or_else(|| Error::protocol(format!("<{tag}> tag not found")))?
        .get_text()
        .ok_or_else(|| Error::protocol(format!("text of <{tag}> tag not found")))?
        .to_string())
}

/// Gets optional text value of given XML element for given tag
pub fn get_option_text(element: &Element, tag: &str) -> Option<String> {
    element
        .get_child(tag)
        .map(|v| v.get_text().unwrap_or_default().to_string())
}

/// Gets default text value of given XML element for given tag
pub fn get_default_text(element: &Element, tag: &str) -> String {
    element.get_child(tag).map_or(String::new(), |v| {
        v.get_text().unwrap_or_default().to_string()
    })
}

/// Copies source byte slice into destination byte slice
pub fn copy_slice(dst: &mut [u8], src: &[u8]) -> usize {
    let mut c = 0;
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = *s;
        c += 1;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_name_accepts_valid_names() {
        for name in ["abc", "my-bucket", "my.bucket", "0name9", "a-b.c-d"] {
            assert!(check_bucket_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn bucket_name_rejects_invalid_names() {
        for name in [
            "",
            "ab",
            "Bucket",
            "-bucket",
            "bucket-",
            ".bucket",
            "bucket.",
            "my..bucket",
            "my_bucket",
            "bucket!",
            &"a".repeat(64),
        ] {
            assert!(check_bucket_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn object_name_rejects_dot_segments() {
        assert!(check_object_name("a/./b").is_err());
        assert!(check_object_name("../a").is_err());
        assert!(check_object_name("").is_err());
        assert!(check_object_name("a/b/c.txt").is_ok());
        assert!(check_object_name(".hidden").is_ok());
    }

    #[test]
    fn object_key_encoding_preserves_slash() {
        assert_eq!(url_encode_object_key("a/b c+d"), "a/b%20c%2Bd");
        assert_eq!(url_encode_object_key("télé/x"), "t%C3%A9l%C3%A9/x");
    }

    #[test]
    fn user_headers_are_categorized() {
        let mut map = Multimap::new();
        map.add("Content-Type", "text/plain");
        map.add("storage-class", "REDUCED_REDUNDANCY");
        map.add("X-Amz-Tagging", "a=b");
        map.add("project", "alpha");

        let normalized = normalize_user_headers(&map);
        assert_eq!(
            normalized.get("Content-Type").map(String::as_str),
            Some("text/plain")
        );
        assert_eq!(
            normalized.get("x-amz-storage-class").map(String::as_str),
            Some("REDUCED_REDUNDANCY")
        );
        assert_eq!(
            normalized.get("X-Amz-Tagging").map(String::as_str),
            Some("a=b")
        );
        assert_eq!(
            normalized.get("x-amz-meta-project").map(String::as_str),
            Some("alpha")
        );
    }

    #[test]
    fn trim_quotes_strips_one_pair() {
        assert_eq!(trim_quotes("\"abc\""), "abc");
        assert_eq!(trim_quotes("abc"), "abc");
        assert_eq!(trim_quotes("\"abc"), "\"abc");
    }

    #[test]
    fn http_header_date_round_trip() {
        let t = from_http_header_value("Fri, 24 May 2013 00:00:00 GMT").unwrap();
        assert_eq!(to_http_header_value(t), "Fri, 24 May 2013 00:00:00 GMT");
    }
}
