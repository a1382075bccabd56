//! Object rendering
//!
//! [`RenderEngine::render`] merges an [`Object`](crate::model::Object) with
//! its [`Type`](crate::model::Type) into a [`RenderResult`]: field values
//! joined with their descriptors, single-hop references resolved into
//! [`Reference`]s, reference sections expanded against foreign objects up to
//! the requested depth, and summary and external-link templates filled.

pub mod dates;
pub mod engine;
pub mod externals;
pub mod fields;
pub mod reference;
pub mod result;
mod sections;
pub mod summary;
pub mod template;

pub use engine::{RenderEngine, RenderRequest};
pub use externals::{fill_external, fill_externals};
pub use fields::merge_field;
pub use reference::ReferenceResolver;
pub use result::{
    ObjectInformation, ObjectSummary, Reference, ReferenceSummary, RenderResult, RenderedExternal,
    RenderedField, SectionReferenceView, TypeInformation,
};
pub use template::{interpolate, Template};
