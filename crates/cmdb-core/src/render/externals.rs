use crate::errors::{CmdbError, Result};
use crate::model::{value_is_empty, ExternalLink, Object, Type};
use crate::render::result::RenderedExternal;
use crate::render::template::{display_value, interpolate};

/// Field name standing for the object's own public_id in link templates
pub const OBJECT_ID_FIELD: &str = "object_id";

/// Fill every external link declared on `type_`, in declaration order
///
/// A link whose required values are missing or whose template cannot be
/// filled is omitted; the others are unaffected.
pub fn fill_externals(type_: &Type, object: &Object) -> Vec<RenderedExternal> {
    type_
        .externals
        .iter()
        .filter_map(|link| match fill_external(link, object) {
            Ok(external) => Some(external),
            Err(err) => {
                tracing::debug!(
                    object_id = object.public_id,
                    link = %link.name,
                    error = %err,
                    "external link omitted"
                );
                None
            }
        })
        .collect()
}

/// Fill a single external link
///
/// # Errors
///
/// Returns `FieldResolution` when a required field is missing or empty, and
/// `Interpolation` when the href template cannot take the values.
pub fn fill_external(link: &ExternalLink, object: &Object) -> Result<RenderedExternal> {
    let mut values = Vec::with_capacity(link.fields.len());
    for name in &link.fields {
        if name == OBJECT_ID_FIELD {
            values.push(object.public_id.to_string());
            continue;
        }
        match object.get_value(name) {
            Some(value) if !value_is_empty(value) => values.push(display_value(value)),
            _ => {
                return Err(CmdbError::FieldResolution {
                    field: name.clone(),
                    reason: format!("required by external link {}", link.name),
                })
            }
        }
    }

    let href = if link.fields.is_empty() {
        link.href.clone()
    } else {
        interpolate(&link.href, &values)?
    };

    Ok(RenderedExternal {
        name: link.name.clone(),
        label: link.label.clone(),
        href,
        icon: link.icon.clone().unwrap_or_default(),
    })
}
