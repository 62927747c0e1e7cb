//! Lossless conversions between the store-agnostic attribute model and the
//! SDK's wire types. A value the model cannot represent is an error, never
//! a silent drop or coercion.

use crate::error::StoreError;
use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use model::{
    record::{Record, RecordKey},
    value::AttrValue,
};
use std::collections::HashMap;

pub fn attr_to_sdk(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::S(s) => AttributeValue::S(s.clone()),
        AttrValue::N(n) => AttributeValue::N(n.clone()),
        AttrValue::B(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        AttrValue::Bool(b) => AttributeValue::Bool(*b),
        AttrValue::Null => AttributeValue::Null(true),
        AttrValue::Ss(values) => AttributeValue::Ss(values.clone()),
        AttrValue::Ns(values) => AttributeValue::Ns(values.clone()),
        AttrValue::Bs(values) => {
            AttributeValue::Bs(values.iter().cloned().map(Blob::new).collect())
        }
        AttrValue::L(items) => AttributeValue::L(items.iter().map(attr_to_sdk).collect()),
        AttrValue::M(map) => AttributeValue::M(
            map.iter()
                .map(|(name, nested)| (name.clone(), attr_to_sdk(nested)))
                .collect(),
        ),
    }
}

pub fn attr_from_sdk(value: AttributeValue) -> Result<AttrValue, StoreError> {
    match value {
        AttributeValue::S(s) => Ok(AttrValue::S(s)),
        AttributeValue::N(n) => Ok(AttrValue::N(n)),
        AttributeValue::B(blob) => Ok(AttrValue::B(blob.into_inner())),
        AttributeValue::Bool(b) => Ok(AttrValue::Bool(b)),
        AttributeValue::Null(_) => Ok(AttrValue::Null),
        AttributeValue::Ss(values) => Ok(AttrValue::Ss(values)),
        AttributeValue::Ns(values) => Ok(AttrValue::Ns(values)),
        AttributeValue::Bs(blobs) => Ok(AttrValue::Bs(
            blobs.into_iter().map(Blob::into_inner).collect(),
        )),
        AttributeValue::L(items) => Ok(AttrValue::L(
            items
                .into_iter()
                .map(attr_from_sdk)
                .collect::<Result<_, _>>()?,
        )),
        AttributeValue::M(map) => {
            let mut nested = std::collections::BTreeMap::new();
            for (name, item) in map {
                nested.insert(name, attr_from_sdk(item)?);
            }
            Ok(AttrValue::M(nested))
        }
        other => Err(StoreError::Encoding(format!(
            "unsupported attribute variant: {other:?}"
        ))),
    }
}

pub fn record_to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .attributes()
        .iter()
        .map(|(name, value)| (name.clone(), attr_to_sdk(value)))
        .collect()
}

pub fn record_from_item(item: HashMap<String, AttributeValue>) -> Result<Record, StoreError> {
    let mut record = Record::new();
    for (name, value) in item {
        record.insert(name, attr_from_sdk(value)?);
    }
    Ok(record)
}

pub fn key_to_item(key: &RecordKey) -> HashMap<String, AttributeValue> {
    key.attributes()
        .iter()
        .map(|(name, value)| (name.clone(), attr_to_sdk(value)))
        .collect()
}

pub fn key_from_item(item: HashMap<String, AttributeValue>) -> Result<RecordKey, StoreError> {
    let mut attributes = std::collections::BTreeMap::new();
    for (name, value) in item {
        attributes.insert(name, attr_from_sdk(value)?);
    }
    Ok(RecordKey::from(attributes))
}
