use serde::{Deserialize, Serialize};

use super::{TypeAcl, TypeId};

/// Declared kind of a type field
///
/// Unrecognised kinds deserialize to [`FieldKind::Other`] and are merged as
/// plain scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Password,
    Email,
    Phone,
    Href,
    Textarea,
    Number,
    Checkbox,
    Radio,
    Select,
    Date,
    Ref,
    Location,
    RefSectionField,
    #[serde(other)]
    Other,
}

/// How the field merger treats a value of a given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Copy the stored value as-is
    Scalar,
    /// Copy, parsing textual values into a structured date
    Date,
    /// Copy and resolve a single-hop [`crate::render::Reference`]
    Reference,
    /// Backing field of a reference section; resolved recursively
    ReferenceSection,
}

impl FieldKind {
    pub fn strategy(&self) -> MergeStrategy {
        match self {
            FieldKind::Date => MergeStrategy::Date,
            FieldKind::Ref | FieldKind::Location => MergeStrategy::Reference,
            FieldKind::RefSectionField => MergeStrategy::ReferenceSection,
            _ => MergeStrategy::Scalar,
        }
    }

    /// Whether values of this kind hold another object's public_id
    pub fn holds_object_id(&self) -> bool {
        matches!(
            self,
            FieldKind::Ref | FieldKind::Location | FieldKind::RefSectionField
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Password => "password",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Href => "href",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::Date => "date",
            FieldKind::Ref => "ref",
            FieldKind::Location => "location",
            FieldKind::RefSectionField => "ref-section-field",
            FieldKind::Other => "other",
        }
    }
}

/// Per-target-type display override carried by a reference field
///
/// Selected by the referenced object's `type_id`. A `line` template uses
/// positional `{}` placeholders filled from `fields` in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceSummaryOverride {
    pub type_id: TypeId,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub prefix: Option<bool>,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// A field declared on a Type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub ref_types: Vec<TypeId>,
    #[serde(default)]
    pub summaries: Vec<ReferenceSummaryOverride>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            label: label.into(),
            ref_types: Vec::new(),
            summaries: Vec::new(),
        }
    }

    /// A `ref` field constrained to the given target types
    pub fn reference(name: impl Into<String>, label: impl Into<String>, ref_types: Vec<TypeId>) -> Self {
        Self {
            ref_types,
            ..Self::new(name, FieldKind::Ref, label)
        }
    }

    pub fn with_summary_override(mut self, summary: ReferenceSummaryOverride) -> Self {
        self.summaries.push(summary);
        self
    }

    /// Display override for a given target type, if the field declares one
    pub fn override_for(&self, type_id: TypeId) -> Option<&ReferenceSummaryOverride> {
        self.summaries.iter().find(|s| s.type_id == type_id)
    }

    /// Whether this is a `ref` field allowed to point at `type_id`
    pub fn references_type(&self, type_id: TypeId) -> bool {
        self.kind == FieldKind::Ref && self.ref_types.contains(&type_id)
    }
}

/// Plain group of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSection {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Declares the field vocabulary of a repeated group on objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDataSection {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// The foreign type and section a reference section projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReference {
    pub type_id: TypeId,
    pub section_name: String,
    /// Stored field subset; `None` or empty means "the whole foreign section"
    #[serde(default)]
    pub selected_fields: Option<Vec<String>>,
}

/// Section that displays fields of another object
///
/// `field` names the backing field on the owning type whose value is the
/// foreign object's public_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSection {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub field: String,
    pub reference: SectionReference,
}

impl ReferenceSection {
    /// Build a section backed by the conventional `{name}-field` field
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        type_id: TypeId,
        section_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            field: format!("{}-field", name),
            name,
            label: label.into(),
            reference: SectionReference {
                type_id,
                section_name: section_name.into(),
                selected_fields: None,
            },
        }
    }

    pub fn with_selected_fields(mut self, fields: Vec<String>) -> Self {
        self.reference.selected_fields = Some(fields);
        self
    }
}

/// One entry of a type's render section list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SectionDescriptor {
    #[serde(rename = "section")]
    Field(FieldSection),
    #[serde(rename = "multi-data-section")]
    MultiData(MultiDataSection),
    #[serde(rename = "reference-section")]
    Reference(ReferenceSection),
}

impl SectionDescriptor {
    pub fn name(&self) -> &str {
        match self {
            SectionDescriptor::Field(s) => &s.name,
            SectionDescriptor::MultiData(s) => &s.name,
            SectionDescriptor::Reference(s) => &s.name,
        }
    }

    /// Field names listed directly on the section
    ///
    /// Reference sections list no own fields; their projection comes from
    /// the foreign section.
    pub fn field_names(&self) -> &[String] {
        match self {
            SectionDescriptor::Field(s) => &s.fields,
            SectionDescriptor::MultiData(s) => &s.fields,
            SectionDescriptor::Reference(_) => &[],
        }
    }
}

/// External link template declared on a type
///
/// `href` placeholders are filled from `fields` in order; the special field
/// name `object_id` stands for the object's own public_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Fields making up the default summary of a type's objects
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Schema definition for a class of configuration items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub public_id: TypeId,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
    #[serde(default)]
    pub externals: Vec<ExternalLink>,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub acl: TypeAcl,
}

fn default_active() -> bool {
    true
}

impl Type {
    pub fn new(public_id: TypeId, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            public_id,
            name: name.into(),
            label: label.into(),
            active: true,
            fields: Vec::new(),
            sections: Vec::new(),
            externals: Vec::new(),
            summary: SummaryConfig::default(),
            icon: None,
            acl: TypeAcl::default(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_section(mut self, section: SectionDescriptor) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_external(mut self, link: ExternalLink) -> Self {
        self.externals.push(link);
        self
    }

    pub fn with_summary_fields(mut self, fields: Vec<String>) -> Self {
        self.summary.fields = fields;
        self
    }

    /// Look up a declared field by name
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a section by name
    pub fn get_section(&self, name: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Icon with the empty-string fallback used in rendered output
    pub fn icon_or_default(&self) -> &str {
        self.icon.as_deref().unwrap_or("")
    }

    pub fn has_summaries(&self) -> bool {
        !self.summary.fields.is_empty()
    }

    /// Declared descriptors of the summary fields; undeclared names are skipped
    pub fn summary_fields(&self) -> Vec<&FieldDescriptor> {
        self.summary
            .fields
            .iter()
            .filter_map(|name| self.get_field(name))
            .collect()
    }

    /// `ref` fields allowed to point at objects of `type_id`
    pub fn ref_fields_targeting(&self, type_id: TypeId) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |f| f.references_type(type_id))
    }

    /// Reference sections projecting a section of `type_id`
    pub fn reference_sections_targeting(
        &self,
        type_id: TypeId,
    ) -> impl Iterator<Item = &ReferenceSection> {
        self.sections.iter().filter_map(move |s| match s {
            SectionDescriptor::Reference(r) if r.reference.type_id == type_id => Some(r),
            _ => None,
        })
    }

    /// Whether objects of this type can reference objects of `type_id`
    /// through a field or a reference section
    pub fn references_type(&self, type_id: TypeId) -> bool {
        self.ref_fields_targeting(type_id).next().is_some()
            || self.reference_sections_targeting(type_id).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_kind_strategy() {
        assert_eq!(FieldKind::Text.strategy(), MergeStrategy::Scalar);
        assert_eq!(FieldKind::Date.strategy(), MergeStrategy::Date);
        assert_eq!(FieldKind::Ref.strategy(), MergeStrategy::Reference);
        assert_eq!(FieldKind::Location.strategy(), MergeStrategy::Reference);
        assert_eq!(
            FieldKind::RefSectionField.strategy(),
            MergeStrategy::ReferenceSection
        );
    }

    #[test]
    fn test_field_kind_deserializes_unknown_as_other() {
        let kind: FieldKind = serde_json::from_value(json!("ref-section-field")).unwrap();
        assert_eq!(kind, FieldKind::RefSectionField);

        let kind: FieldKind = serde_json::from_value(json!("hologram")).unwrap();
        assert_eq!(kind, FieldKind::Other);
    }

    #[test]
    fn test_section_descriptor_tagging() {
        let section: SectionDescriptor = serde_json::from_value(json!({
            "type": "reference-section",
            "name": "host",
            "label": "Host",
            "field": "host-field",
            "reference": { "type_id": 3, "section_name": "network" }
        }))
        .unwrap();

        match section {
            SectionDescriptor::Reference(r) => {
                assert_eq!(r.field, "host-field");
                assert_eq!(r.reference.type_id, 3);
                assert!(r.reference.selected_fields.is_none());
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_reference_section_backing_field_convention() {
        let section = ReferenceSection::new("rack", "Rack", 4, "location");
        assert_eq!(section.field, "rack-field");
    }

    #[test]
    fn test_references_type() {
        let t = Type::new(1, "server", "Server")
            .with_field(FieldDescriptor::reference("ref-b", "B", vec![2]))
            .with_section(SectionDescriptor::Reference(ReferenceSection::new(
                "rack", "Rack", 4, "location",
            )));

        assert!(t.references_type(2));
        assert!(t.references_type(4));
        assert!(!t.references_type(9));
    }
}
