use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ObjectId, TypeId, UserId};

/// One stored `{name, value}` pair on an Object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One row of a multi-data section: an ordered set of field values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MdsValue {
    #[serde(default)]
    pub data: Vec<FieldValue>,
}

/// Repeated-group area on an Object
///
/// The vocabulary of `data` entries is declared by the Type's
/// multi-data section named `section_id`, not by the Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MdsEntry {
    pub section_id: String,
    #[serde(default)]
    pub values: Vec<MdsValue>,
}

impl MdsEntry {
    /// Whether the entry holds at least one row
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Iterate every nested field value across all rows
    pub fn field_values(&self) -> impl Iterator<Item = &FieldValue> {
        self.values.iter().flat_map(|row| row.data.iter())
    }

    /// Mutable counterpart of [`MdsEntry::field_values`]
    pub fn field_values_mut(&mut self) -> impl Iterator<Item = &mut FieldValue> {
        self.values.iter_mut().flat_map(|row| row.data.iter_mut())
    }
}

/// A stored configuration item
///
/// `fields` is kept as an ordered list: unknown stored fields are preserved
/// untouched and lookup by name takes the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub public_id: ObjectId,
    pub type_id: TypeId,
    #[serde(default)]
    pub fields: Vec<FieldValue>,
    #[serde(default)]
    pub multi_data_sections: Vec<MdsEntry>,
    pub active: bool,
    pub version: String,
    pub author_id: UserId,
    #[serde(default)]
    pub editor_id: Option<UserId>,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub last_edit_time: Option<DateTime<Utc>>,
}

impl Object {
    /// Create an active object at version 1.0.0 with no fields
    pub fn new(public_id: ObjectId, type_id: TypeId, author_id: UserId) -> Self {
        Self {
            public_id,
            type_id,
            fields: Vec::new(),
            multi_data_sections: Vec::new(),
            active: true,
            version: "1.0.0".to_string(),
            author_id,
            editor_id: None,
            creation_time: Utc::now(),
            last_edit_time: None,
        }
    }

    /// Builder-style helper used by fixtures and importers
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push(FieldValue::new(name, value));
        self
    }

    /// Builder-style helper for multi-data sections
    pub fn with_multi_data_section(mut self, entry: MdsEntry) -> Self {
        self.multi_data_sections.push(entry);
        self
    }

    /// Stored value by field name; the first match wins
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Whether any multi-data section row exists
    pub fn has_multi_data_values(&self) -> bool {
        self.multi_data_sections.iter().any(MdsEntry::has_values)
    }
}
