//! Render output types
//!
//! Everything here is produced fresh per render call and never persisted.
//! The HTTP layer serializes it, audit logging snapshots it and search
//! extracts matches from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::{
    FieldDescriptor, FieldKind, MdsEntry, ObjectId, SectionDescriptor, TypeAcl, TypeId, UserId,
};

/// One summary value of a reference target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// Resolved description of the object a reference field points at
///
/// `Reference::default()` is the blank reference returned when the target
/// does not exist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reference {
    pub type_id: TypeId,
    pub object_id: ObjectId,
    pub type_label: String,
    pub icon: String,
    /// Whether the caller should prepend `type_label` to `line`
    pub prefix: bool,
    pub summaries: Vec<ReferenceSummary>,
    pub line: String,
}

impl Reference {
    /// Whether this is the blank reference of a missing target
    pub fn is_blank(&self) -> bool {
        self.object_id == 0 && self.type_id == 0
    }
}

/// Foreign object projected by a reference section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReferenceView {
    pub type_id: TypeId,
    pub type_name: String,
    pub type_label: String,
    pub object_id: ObjectId,
    pub fields: Vec<RenderedField>,
}

/// A field descriptor merged with its stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<SectionReferenceView>,
}

impl RenderedField {
    pub fn from_descriptor(descriptor: &FieldDescriptor, value: Value) -> Self {
        Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            label: descriptor.label.clone(),
            value,
            reference: None,
            references: None,
        }
    }

    /// Entry for a section field name the type does not declare
    pub fn undeclared(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Other,
            label: String::new(),
            value: Value::Null,
            reference: None,
            references: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInformation {
    pub object_id: ObjectId,
    pub creation_time: DateTime<Utc>,
    pub last_edit_time: Option<DateTime<Utc>>,
    pub author_id: UserId,
    pub author_name: String,
    pub editor_id: Option<UserId>,
    pub editor_name: Option<String>,
    pub active: bool,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInformation {
    pub type_id: TypeId,
    pub type_name: String,
    pub type_label: String,
    pub icon: String,
    pub active: bool,
    pub acl: TypeAcl,
}

/// One entry of an object's own summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: Value,
}

/// A filled external link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedExternal {
    pub name: String,
    pub label: String,
    pub href: String,
    pub icon: String,
}

/// Fully merged projection of an Object and its Type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    pub object_information: ObjectInformation,
    pub type_information: TypeInformation,
    pub fields: Vec<RenderedField>,
    pub sections: Vec<SectionDescriptor>,
    pub summaries: Vec<ObjectSummary>,
    pub summary_line: String,
    pub externals: Vec<RenderedExternal>,
    pub multi_data_sections: Vec<MdsEntry>,
    /// Effective field projection used for each reference section, keyed by
    /// section name. Defaults computed during the call show up here instead
    /// of being written back onto the type.
    #[serde(default)]
    pub section_projections: BTreeMap<String, Vec<String>>,
}

impl RenderResult {
    /// Find a top-level rendered field by name
    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
