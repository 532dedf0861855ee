//! Request attributes: method, parameters, headers and credentials.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Request parameters, sent as query string or form body depending on the method.
///
/// Keys are kept sorted so two maps built in a different order compare equal.
pub type RequestData = BTreeMap<String, DataValue>;

/// Request headers by name.
pub type Headers = BTreeMap<String, String>;

/// HTTP verbs the courier can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether responses to this verb may be read from or written to the cache.
    ///
    /// PUT, PATCH and DELETE have side effects and always reach the transport.
    pub fn is_cache_eligible(&self) -> bool {
        matches!(self, Method::Get | Method::Post)
    }

    /// Whether request data travels in the URL query rather than the body.
    pub fn sends_data_as_query(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<DataValue>),
}

impl DataValue {
    /// Render a scalar as it appears in an encoded query or form body.
    ///
    /// Booleans encode as `1` / `0`. Arrays have no scalar form.
    pub fn as_param(&self) -> Option<String> {
        match self {
            DataValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            DataValue::Integer(i) => Some(i.to_string()),
            DataValue::Float(f) => Some(f.to_string()),
            DataValue::Text(s) => Some(s.clone()),
            DataValue::Array(_) => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(value as i64)
    }
}

impl From<u32> for DataValue {
    fn from(value: u32) -> Self {
        DataValue::Integer(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(values: Vec<T>) -> Self {
        DataValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Flatten request data into encoded key/value pairs.
///
/// Array values repeat the key with a `[]` suffix: `tags[]=a&tags[]=b`.
pub fn to_param_pairs(data: &RequestData) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(data.len());
    for (key, value) in data {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &DataValue) {
    match value {
        DataValue::Array(items) => {
            let item_key = format!("{}[]", key);
            for item in items {
                push_pairs(pairs, item_key.clone(), item);
            }
        }
        scalar => {
            if let Some(param) = scalar.as_param() {
                pairs.push((key, param));
            }
        }
    }
}

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: String,
}

impl BasicAuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Password stays out of logs.
impl fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_eligible_verbs() {
        assert!(Method::Get.is_cache_eligible());
        assert!(Method::Post.is_cache_eligible());
        assert!(!Method::Put.is_cache_eligible());
        assert!(!Method::Patch.is_cache_eligible());
        assert!(!Method::Delete.is_cache_eligible());
    }

    #[test]
    fn test_method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Method::Patch).unwrap(), "\"PATCH\"");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_param_pairs_expand_arrays() {
        let mut data = RequestData::new();
        data.insert("tags".into(), vec!["a", "b"].into());
        data.insert("page".into(), 2.into());
        data.insert("active".into(), true.into());

        let pairs = to_param_pairs(&data);
        assert_eq!(
            pairs,
            vec![
                ("active".to_string(), "1".to_string()),
                ("page".to_string(), "2".to_string()),
                ("tags[]".to_string(), "a".to_string()),
                ("tags[]".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_data_insertion_order_irrelevant() {
        let mut first = RequestData::new();
        first.insert("a".into(), 1.into());
        first.insert("b".into(), "x".into());

        let mut second = RequestData::new();
        second.insert("b".into(), "x".into());
        second.insert("a".into(), 1.into());

        assert_eq!(first, second);
        assert_eq!(to_param_pairs(&first), to_param_pairs(&second));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = BasicAuthCredentials::new("alice", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }
}
