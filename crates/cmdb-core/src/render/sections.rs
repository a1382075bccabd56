use serde_json::Value;

use crate::errors::{CmdbError, Result};
use crate::model::{
    value_as_object_id, FieldDescriptor, FieldKind, Object, Permission, ReferenceSection,
    SectionDescriptor, Type,
};
use crate::render::engine::RenderPass;
use crate::render::fields::merge_field;
use crate::render::result::{RenderedField, SectionReferenceView};

impl<'p> RenderPass<'p> {
    /// Walk the section list of `type_` and merge every field it names
    ///
    /// Per-field and per-section failures that only mean "missing" are
    /// absorbed; `AccessDenied` and store failures abort the walk.
    pub(crate) fn merge_sections(
        &mut self,
        object: &Object,
        type_: &Type,
        depth: u32,
    ) -> Result<Vec<RenderedField>> {
        let mut fields = Vec::new();

        for section in &type_.sections {
            match section {
                SectionDescriptor::Field(_) | SectionDescriptor::MultiData(_) => {
                    for name in section.field_names() {
                        fields.push(self.merge_named(object, type_, name)?);
                    }
                }
                SectionDescriptor::Reference(reference) => {
                    match self.resolve_reference_section(object, type_, reference, depth) {
                        Ok(field) => fields.push(field),
                        Err(err) if err.is_recoverable() => {
                            tracing::debug!(
                                object_id = object.public_id,
                                section = %reference.name,
                                error = %err,
                                "reference section dropped"
                            );
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }

        Ok(fields)
    }

    fn merge_named(&self, object: &Object, type_: &Type, name: &str) -> Result<RenderedField> {
        let Some(descriptor) = type_.get_field(name) else {
            tracing::debug!(
                type_id = type_.public_id,
                field = name,
                "section names an undeclared field"
            );
            return Ok(RenderedField::undeclared(name));
        };

        match merge_field(descriptor, object, self.references()) {
            Ok(field) => Ok(field),
            Err(err) if err.is_recoverable() => {
                tracing::debug!(object_id = object.public_id, field = name, error = %err, "field value dropped");
                Ok(RenderedField::from_descriptor(descriptor, Value::Null))
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve one reference section of `object` into its backing field
    ///
    /// The returned field carries the foreign object's id as value and the
    /// projected foreign fields under `references`. An unset backing field
    /// yields the field with a null value and no projection, as does a
    /// foreign object already on the path of a nested walk.
    fn resolve_reference_section(
        &mut self,
        object: &Object,
        type_: &Type,
        section: &ReferenceSection,
        depth: u32,
    ) -> Result<RenderedField> {
        let backing = type_.get_field(&section.field).cloned().unwrap_or_else(|| {
            FieldDescriptor::new(
                section.field.clone(),
                FieldKind::RefSectionField,
                section.label.clone(),
            )
        });

        let Some(foreign_id) = object.get_value(&section.field).and_then(value_as_object_id)
        else {
            return Ok(RenderedField::from_descriptor(&backing, Value::Null));
        };

        if self.path.len() > 1 && self.path.contains(&foreign_id) {
            tracing::debug!(object_id = foreign_id, "reference section cycle cut");
            return Ok(RenderedField::from_descriptor(&backing, Value::from(foreign_id)));
        }

        let foreign = self.store.get_object(foreign_id)?;
        let foreign_type = self.store.get_type(foreign.type_id)?;
        if foreign_type.public_id != section.reference.type_id {
            return Err(CmdbError::SectionResolution {
                section: section.name.clone(),
                reason: format!(
                    "object {} is of type {}, expected {}",
                    foreign_id, foreign_type.public_id, section.reference.type_id
                ),
            });
        }
        if let Some(user) = self.user {
            self.access.verify(&foreign_type, user, Permission::Read)?;
        }

        let projection = self.projection_for(section, &foreign_type)?;
        if self.path.len() == 1 {
            self.projections
                .insert(section.name.clone(), projection.clone());
        }

        let mut projected = Vec::with_capacity(projection.len());
        for name in &projection {
            let nested = foreign_type
                .get_field(name)
                .is_some_and(|d| d.kind == FieldKind::RefSectionField);
            if nested {
                let leaves = self.flatten_nested(&foreign, &foreign_type, name, depth.saturating_sub(1))?;
                projected.extend(leaves);
            } else {
                projected.push(self.merge_named(&foreign, &foreign_type, name)?);
            }
        }

        let mut field = RenderedField::from_descriptor(&backing, Value::from(foreign_id));
        field.references = Some(SectionReferenceView {
            type_id: foreign_type.public_id,
            type_name: foreign_type.name.clone(),
            type_label: foreign_type.label.clone(),
            object_id: foreign_id,
            fields: projected,
        });
        Ok(field)
    }

    /// Fields of the foreign section to show
    ///
    /// Caller selection wins over the stored selection, which wins over the
    /// whole foreign section. Only the outermost object's sections take a
    /// caller selection.
    fn projection_for(&self, section: &ReferenceSection, foreign_type: &Type) -> Result<Vec<String>> {
        let foreign_section = foreign_type
            .get_section(&section.reference.section_name)
            .ok_or_else(|| CmdbError::SectionNotFound {
                type_id: foreign_type.public_id,
                section: section.reference.section_name.clone(),
            })?;
        let available = foreign_section.field_names();

        if self.path.len() == 1 {
            if let Some(selected) = self.request.projections.get(&section.name) {
                return Ok(selected.clone());
            }
        }

        match section.reference.selected_fields.as_deref() {
            Some(selected) if !selected.is_empty() => Ok(available
                .iter()
                .filter(|name| selected.contains(*name))
                .cloned()
                .collect()),
            _ => Ok(available.to_vec()),
        }
    }

    /// Leaf fields of the reference section of `object` backed by `field`
    ///
    /// Empty once the depth budget is spent or when `object` is already being
    /// rendered further up the current path.
    fn flatten_nested(
        &mut self,
        object: &Object,
        type_: &Type,
        field: &str,
        depth: u32,
    ) -> Result<Vec<RenderedField>> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        if self.path.contains(&object.public_id) {
            tracing::debug!(object_id = object.public_id, "reference section cycle cut");
            return Ok(Vec::new());
        }
        let Some(section) = type_.sections.iter().find_map(|s| match s {
            SectionDescriptor::Reference(r) if r.field == field => Some(r),
            _ => None,
        }) else {
            return Ok(Vec::new());
        };

        self.path.push(object.public_id);
        let resolved = self.resolve_reference_section(object, type_, section, depth);
        self.path.pop();

        match resolved {
            Ok(field) => Ok(field.references.map(|view| view.fields).unwrap_or_default()),
            Err(err) if err.is_recoverable() => {
                tracing::debug!(object_id = object.public_id, error = %err, "nested section dropped");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}
