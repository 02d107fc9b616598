//! Structural/semantic validation of a decrypted vault document (spec §2
//! C7, §4.6).
//!
//! This runs on the raw `serde_json::Value` produced by AEAD decryption,
//! before it is ever deserialised into [`crate::items::VaultDocument`].
//! That ordering matters: a document that decrypts successfully but is
//! garbage (wrong shape, unknown item type, missing field) is a distinct
//! failure mode from a failed decryption, and the two must never be
//! conflated (spec §4.6, §7).

use serde_json::Value;
use thiserror::Error;

const KNOWN_ITEM_TYPES: &[&str] = &["password", "note", "secret", "file"];

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

fn fail(reason: impl Into<String>) -> SchemaError {
    SchemaError(reason.into())
}

/// Validate a decrypted vault document's shape. Never surfaces any of the
/// document's actual field values in the error message, only field names
/// and what was structurally wrong with them.
pub fn validate_vault_document(value: &Value) -> Result<(), SchemaError> {
    let obj = value.as_object().ok_or_else(|| fail("document is not an object"))?;

    let version = obj.get("version").ok_or_else(|| fail("missing field: version"))?;
    if !version.is_u64() {
        return Err(fail("field 'version' is not a non-negative integer"));
    }

    let items = obj.get("items").ok_or_else(|| fail("missing field: items"))?;
    let items = items.as_array().ok_or_else(|| fail("field 'items' is not an array"))?;

    for (index, item) in items.iter().enumerate() {
        validate_item(item).map_err(|SchemaError(reason)| {
            fail(format!("items[{index}]: {reason}"))
        })?;
    }

    Ok(())
}

fn validate_item(item: &Value) -> Result<(), SchemaError> {
    let obj = item.as_object().ok_or_else(|| fail("item is not an object"))?;

    let id = obj.get("id").ok_or_else(|| fail("missing field: id"))?;
    let id = id.as_str().ok_or_else(|| fail("field 'id' is not a string"))?;
    if id.is_empty() {
        return Err(fail("field 'id' is empty"));
    }

    let item_type = obj.get("type").ok_or_else(|| fail("missing field: type"))?;
    let item_type = item_type
        .as_str()
        .ok_or_else(|| fail("field 'type' is not a string"))?;
    if !KNOWN_ITEM_TYPES.contains(&item_type) {
        return Err(fail(format!("field 'type' has unknown value '{item_type}'")));
    }

    let title = obj.get("title").ok_or_else(|| fail("missing field: title"))?;
    if !title.is_string() {
        return Err(fail("field 'title' is not a string"));
    }

    for field in ["createdAt", "modifiedAt"] {
        let value = obj.get(field).ok_or_else(|| fail(format!("missing field: {field}")))?;
        if !value.is_u64() {
            return Err(fail(format!("field '{field}' is not numeric")));
        }
    }

    Ok(())
}
