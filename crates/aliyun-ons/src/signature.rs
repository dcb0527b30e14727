//! Signing of RPC-style Alibaba Cloud API requests (signature version 1.0).
//!
//! The canonical query string is built from the request parameters sorted by key,
//! with keys and values percent-encoded using the RFC 3986 unreserved set. The string
//! to sign is `<METHOD>&%2F&<percent-encoded canonical query>`, and the signature is
//! the base64 encoded HMAC-SHA1 of that string keyed with `<secret>&`.
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;

/// The value of the `SignatureMethod` parameter.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// The value of the `SignatureVersion` parameter.
pub const SIGNATURE_VERSION: &str = "1.0";

/// Percent-encode a string, leaving only `A-Z a-z 0-9 - _ . ~` untouched.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Build the canonical query string for a set of parameters.
///
/// Parameters are sorted by key; duplicate keys keep their relative order.
pub fn canonical_query<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted: Vec<_> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign for a request with the given HTTP method and canonical query.
pub fn string_to_sign(method: &str, canonical_query: &str) -> String {
    format!(
        "{}&{}&{}",
        method,
        percent_encode("/"),
        percent_encode(canonical_query)
    )
}

/// Sign a string with an AccessKey secret.
pub fn sign(access_key_secret: &str, string_to_sign: &str) -> String {
    let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(format!("{access_key_secret}&").as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Produce the full, signed query string for a `GET` request.
///
/// The returned string already contains the `Signature` parameter and can be appended
/// to `https://<endpoint>/?` as-is.
pub fn signed_query<K, V>(params: &[(K, V)], access_key_secret: &str) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let canonical = canonical_query(params);
    let signature = sign(access_key_secret, &string_to_sign("GET", &canonical));
    format!("{canonical}&Signature={}", percent_encode(&signature))
}
