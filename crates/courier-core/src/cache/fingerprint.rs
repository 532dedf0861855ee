//! Cache keys derived from request attributes.

use crate::models::{DataValue, Headers, Method, RequestData};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// SHA-256 (hex) of a canonical encoding of method, URL, data and headers.
///
/// Data keys and header names are visited in sorted order, and header names are
/// compared case-insensitively, so insertion order never changes the key. Values
/// sent under names that differ only in case are all part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(method: Method, url: &str, data: &RequestData, headers: &Headers) -> Self {
        let mut hasher = Sha256::new();

        write_str(&mut hasher, method.as_str());
        write_str(&mut hasher, url);

        hasher.update((data.len() as u64).to_le_bytes());
        for (key, value) in data {
            write_str(&mut hasher, key);
            write_value(&mut hasher, value);
        }

        // Names differing only in case are all sent, so every value is kept.
        let mut normalized: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (name, value) in headers {
            normalized
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(value.as_str());
        }
        hasher.update((normalized.len() as u64).to_le_bytes());
        for (name, values) in &normalized {
            write_str(&mut hasher, name);
            hasher.update((values.len() as u64).to_le_bytes());
            for value in values {
                write_str(&mut hasher, value);
            }
        }

        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Length prefixes keep ("ab", "c") and ("a", "bc") apart.
fn write_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn write_value(hasher: &mut Sha256, value: &DataValue) {
    match value {
        DataValue::Bool(b) => {
            hasher.update([b'b', *b as u8]);
        }
        DataValue::Integer(i) => {
            hasher.update([b'i']);
            hasher.update(i.to_le_bytes());
        }
        DataValue::Float(f) => {
            hasher.update([b'f']);
            hasher.update(f.to_bits().to_le_bytes());
        }
        DataValue::Text(s) => {
            hasher.update([b's']);
            write_str(hasher, s);
        }
        DataValue::Array(items) => {
            hasher.update([b'a']);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                write_value(hasher, item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_identical_requests_collide() {
        let mut data = RequestData::new();
        data.insert("q".into(), "rust".into());
        let h = headers(&[("Accept", "application/json")]);

        let a = Fingerprint::compute(Method::Get, "https://api.test/search", &data, &h);
        let b = Fingerprint::compute(Method::Get, "https://api.test/search", &data, &h);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_every_attribute_matters() {
        let url = "https://api.test/users";
        let base = Fingerprint::compute(Method::Get, url, &RequestData::new(), &Headers::new());

        let other_method =
            Fingerprint::compute(Method::Post, url, &RequestData::new(), &Headers::new());
        let other_url = Fingerprint::compute(
            Method::Get,
            "https://api.test/users/1",
            &RequestData::new(),
            &Headers::new(),
        );
        let mut data = RequestData::new();
        data.insert("page".into(), 1.into());
        let other_data = Fingerprint::compute(Method::Get, url, &data, &Headers::new());
        let other_headers = Fingerprint::compute(
            Method::Get,
            url,
            &RequestData::new(),
            &headers(&[("Accept", "text/html")]),
        );

        assert_ne!(base, other_method);
        assert_ne!(base, other_url);
        assert_ne!(base, other_data);
        assert_ne!(base, other_headers);
    }

    #[test]
    fn test_value_types_distinguished() {
        let url = "https://api.test/items";
        let mut as_int = RequestData::new();
        as_int.insert("id".into(), 1.into());
        let mut as_text = RequestData::new();
        as_text.insert("id".into(), "1".into());

        assert_ne!(
            Fingerprint::compute(Method::Get, url, &as_int, &Headers::new()),
            Fingerprint::compute(Method::Get, url, &as_text, &Headers::new())
        );
    }

    #[test]
    fn test_header_name_case_ignored() {
        let url = "https://api.test/users";
        let lower = headers(&[("accept", "application/json")]);
        let mixed = headers(&[("Accept", "application/json")]);

        assert_eq!(
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &lower),
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &mixed)
        );
    }

    #[test]
    fn test_case_variant_headers_all_count() {
        let url = "https://api.test/users";
        let both = headers(&[("Accept", "a"), ("accept", "b")]);
        let single = headers(&[("accept", "b")]);
        let swapped = headers(&[("Accept", "b"), ("accept", "a")]);

        let both_fp = Fingerprint::compute(Method::Get, url, &RequestData::new(), &both);
        assert_ne!(
            both_fp,
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &single)
        );
        assert_ne!(
            both_fp,
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &swapped)
        );
    }

    #[test]
    fn test_insertion_order_ignored() {
        let url = "https://api.test/users";
        let mut first = Headers::new();
        first.insert("X-A".into(), "1".into());
        first.insert("X-B".into(), "2".into());
        let mut second = Headers::new();
        second.insert("X-B".into(), "2".into());
        second.insert("X-A".into(), "1".into());

        assert_eq!(
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &first),
            Fingerprint::compute(Method::Get, url, &RequestData::new(), &second)
        );
    }
}
