use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One item of a table: an opaque mapping from attribute name to typed
/// value. The copy engine treats records as atomic write units and never
/// inspects their contents beyond projecting the primary key.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Record(BTreeMap<String, AttrValue>);

impl Record {
    pub fn new() -> Self {
        Record(BTreeMap::new())
    }

    pub fn get(&self, attribute: &str) -> Option<&AttrValue> {
        self.0.get(attribute)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: AttrValue) {
        self.0.insert(attribute.into(), value);
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.0
    }

    pub fn into_attributes(self) -> BTreeMap<String, AttrValue> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Projects the named key attributes into a [`RecordKey`]. Attributes
    /// the record does not carry are omitted, so callers that require a
    /// complete key must check [`RecordKey::len`] themselves.
    pub fn project_key(&self, key_names: &[String]) -> RecordKey {
        let mut key = BTreeMap::new();
        for name in key_names {
            if let Some(value) = self.0.get(name) {
                key.insert(name.clone(), value.clone());
            }
        }
        RecordKey(key)
    }
}

impl From<BTreeMap<String, AttrValue>> for Record {
    fn from(attributes: BTreeMap<String, AttrValue>) -> Self {
        Record(attributes)
    }
}

impl FromIterator<(String, AttrValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

/// The primary-key projection of a record. Doubles as the payload of a
/// scan cursor and as the identifier in failure reports.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordKey(BTreeMap<String, AttrValue>);

impl RecordKey {
    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, AttrValue>> for RecordKey {
    fn from(attributes: BTreeMap<String, AttrValue>) -> Self {
        RecordKey(attributes)
    }
}

impl FromIterator<(String, AttrValue)> for RecordKey {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        RecordKey(iter.into_iter().collect())
    }
}
