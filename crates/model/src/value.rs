use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed attribute value as the store encodes it.
///
/// Values are carried verbatim between source and destination: numbers stay
/// as decimal strings and empty sets/lists/maps keep their type, so a copy
/// can never coerce or drop an encoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttrValue {
    /// String.
    S(String),

    /// Number, kept as the decimal string the store returned.
    N(String),

    /// Binary payload.
    B(Vec<u8>),

    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),

    /// Null marker.
    #[serde(rename = "NULL")]
    Null,

    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),

    /// Number set (decimal strings).
    #[serde(rename = "NS")]
    Ns(Vec<String>),

    /// Binary set.
    #[serde(rename = "BS")]
    Bs(Vec<Vec<u8>>),

    /// List of nested values.
    L(Vec<AttrValue>),

    /// Map of nested values.
    M(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttrValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Store-side type tag, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::S(_) => "S",
            AttrValue::N(_) => "N",
            AttrValue::B(_) => "B",
            AttrValue::Bool(_) => "BOOL",
            AttrValue::Null => "NULL",
            AttrValue::Ss(_) => "SS",
            AttrValue::Ns(_) => "NS",
            AttrValue::Bs(_) => "BS",
            AttrValue::L(_) => "L",
            AttrValue::M(_) => "M",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sets_keep_their_type() {
        let empty_string_set = AttrValue::Ss(Vec::new());
        let empty_list = AttrValue::L(Vec::new());

        assert_ne!(empty_string_set, AttrValue::Null);
        assert_ne!(empty_list, AttrValue::Null);
        assert_eq!(empty_string_set.type_name(), "SS");
        assert_eq!(empty_list.type_name(), "L");
    }

    #[test]
    fn serializes_with_store_type_tags() {
        let json = serde_json::to_string(&AttrValue::Bool(true)).unwrap();
        assert_eq!(json, r#"{"BOOL":true}"#);

        let json = serde_json::to_string(&AttrValue::Ss(vec!["a".to_string()])).unwrap();
        assert_eq!(json, r#"{"SS":["a"]}"#);
    }

    #[test]
    fn numbers_stay_as_strings() {
        let value = AttrValue::N("3.140000000000000001".to_string());
        assert_eq!(value.as_n(), Some("3.140000000000000001"));
    }
}
