use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use cmdb_core_types::schema::OP_RENDER;
use cmdb_core_types::RequestContext;

use crate::access::AccessControl;
use crate::config::{EngineConfig, DEFAULT_RENDER_DEPTH};
use crate::errors::{CmdbError, Result};
use crate::model::{Object, ObjectId, Type, TypeId, User, UserId};
use crate::render::externals::fill_externals;
use crate::render::reference::ReferenceResolver;
use crate::render::result::{ObjectInformation, RenderResult, TypeInformation};
use crate::render::summary::object_summaries;
use crate::store::ObjectStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Per-call render parameters
///
/// `depth` is the recursion budget for reference sections: `0` renders no
/// fields at all, `1` resolves reference sections one hop without expanding
/// nested reference sections, and so on.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub resolve_references: bool,
    pub depth: u32,
    /// Caller-selected field subsets for reference sections, by section name
    pub projections: BTreeMap<String, Vec<String>>,
    pub context: RequestContext,
}

impl RenderRequest {
    pub fn new(depth: u32) -> Self {
        Self {
            resolve_references: true,
            depth,
            projections: BTreeMap::new(),
            context: RequestContext::new(),
        }
    }

    pub fn with_references(mut self, resolve: bool) -> Self {
        self.resolve_references = resolve;
        self
    }

    /// Select the foreign fields shown by one reference section
    pub fn with_projection(mut self, section: impl Into<String>, fields: Vec<String>) -> Self {
        self.projections.insert(section.into(), fields);
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DEPTH)
    }
}

/// Merges objects with their type schema into [`RenderResult`]s
///
/// The engine is read-only: it never writes to the store and never mutates
/// the types it is given, so one engine can serve concurrent calls over a
/// shared store.
pub struct RenderEngine<'a> {
    store: &'a dyn ObjectStore,
    access: &'a dyn AccessControl,
    config: EngineConfig,
}

impl<'a> RenderEngine<'a> {
    pub fn new(store: &'a dyn ObjectStore, access: &'a dyn AccessControl) -> Self {
        Self {
            store,
            access,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A request using the configured default depth
    pub fn default_request(&self) -> RenderRequest {
        RenderRequest::new(self.config.default_depth)
    }

    /// Render `object` against `type_`
    ///
    /// Either the whole result is produced (possibly with null values, blank
    /// references and dropped sections) or one error is returned.
    ///
    /// # Errors
    ///
    /// * `TypeMismatch` - `object.type_id` is not `type_.public_id`
    /// * `AccessDenied` - a resolved reference targets a type the user may not read
    /// * `Render` - any other failure, wrapping its root cause
    pub fn render(
        &self,
        object: &Object,
        type_: &Type,
        user: Option<&User>,
        request: &RenderRequest,
    ) -> Result<RenderResult> {
        log_op_start!(
            OP_RENDER,
            object_id = object.public_id,
            type_id = type_.public_id,
            depth = request.depth,
            request_id = %request.context.request_id
        );
        let start = Instant::now();

        let result = self
            .assemble(object, type_, user, request)
            .map_err(|err| wrap_render_error(object.public_id, err));

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(rendered) => {
                log_op_end!(
                    OP_RENDER,
                    duration_ms = elapsed,
                    object_id = object.public_id,
                    fields_len = rendered.fields.len()
                );
            }
            Err(err) => {
                log_op_error!(
                    OP_RENDER,
                    err.clone(),
                    duration_ms = elapsed,
                    object_id = object.public_id
                );
            }
        }
        result
    }

    /// Load an object and its type, then render it
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound`/`TypeNotFound` when either record is absent,
    /// `AccessDenied` when the user may not read the object's type, and the
    /// errors of [`RenderEngine::render`].
    pub fn render_by_id(
        &self,
        object_id: ObjectId,
        user: Option<&User>,
        request: &RenderRequest,
    ) -> Result<RenderResult> {
        let object = self.store.get_object(object_id)?;
        let type_ = self.store.get_type(object.type_id)?;
        if let Some(user) = user {
            self.access
                .verify(&type_, user, crate::model::Permission::Read)?;
        }
        self.render(&object, &type_, user, request)
    }

    /// Render a list of objects, loading each distinct type once
    ///
    /// # Errors
    ///
    /// Fails on the first object that cannot be rendered.
    pub fn render_many(
        &self,
        objects: &[Object],
        user: Option<&User>,
        request: &RenderRequest,
    ) -> Result<Vec<RenderResult>> {
        let mut types: HashMap<TypeId, Type> = HashMap::new();
        let mut results = Vec::with_capacity(objects.len());
        for object in objects {
            if !types.contains_key(&object.type_id) {
                let type_ = self.store.get_type(object.type_id)?;
                types.insert(object.type_id, type_);
            }
            if let Some(type_) = types.get(&object.type_id) {
                results.push(self.render(object, type_, user, request)?);
            }
        }
        Ok(results)
    }

    fn assemble(
        &self,
        object: &Object,
        type_: &Type,
        user: Option<&User>,
        request: &RenderRequest,
    ) -> Result<RenderResult> {
        if object.type_id != type_.public_id {
            return Err(CmdbError::TypeMismatch {
                object_id: object.public_id,
                object_type_id: object.type_id,
                type_id: type_.public_id,
            });
        }

        let (fields, section_projections) = if request.depth == 0 {
            (Vec::new(), BTreeMap::new())
        } else {
            let mut pass = RenderPass::new(self, user, request);
            pass.path.push(object.public_id);
            let fields = pass.merge_sections(object, type_, request.depth)?;
            (fields, pass.projections)
        };

        let (summaries, summary_line) =
            object_summaries(type_, object, &self.config.summary_separator);

        Ok(RenderResult {
            object_information: ObjectInformation {
                object_id: object.public_id,
                creation_time: object.creation_time,
                last_edit_time: object.last_edit_time,
                author_id: object.author_id,
                author_name: self.user_name(object.author_id),
                editor_id: object.editor_id,
                editor_name: object.editor_id.map(|id| self.user_name(id)),
                active: object.active,
                version: object.version.clone(),
            },
            type_information: TypeInformation {
                type_id: type_.public_id,
                type_name: type_.name.clone(),
                type_label: type_.label.clone(),
                icon: type_.icon_or_default().to_string(),
                active: type_.active,
                acl: type_.acl.clone(),
            },
            fields,
            sections: type_.sections.clone(),
            summaries,
            summary_line,
            externals: fill_externals(type_, object),
            multi_data_sections: object.multi_data_sections.clone(),
            section_projections,
        })
    }

    /// Display name of a user; any lookup failure yields the unknown label
    fn user_name(&self, user_id: UserId) -> String {
        match self.store.get_user(user_id) {
            Ok(user) => user.display_name(),
            Err(err) => {
                tracing::debug!(user_id, error = %err, "user name unavailable");
                self.config.unknown_user_label.clone()
            }
        }
    }
}

/// Keep security and contract errors as-is; wrap everything else
fn wrap_render_error(object_id: ObjectId, err: CmdbError) -> CmdbError {
    match err {
        CmdbError::AccessDenied { .. }
        | CmdbError::TypeMismatch { .. }
        | CmdbError::Render { .. } => err,
        other => CmdbError::Render {
            object_id,
            cause: Box::new(other),
        },
    }
}

/// State of one render call
///
/// `path` holds the objects currently being rendered, outermost first; it
/// guards nested reference-section renders against cycles. `projections`
/// collects the effective field selection of the outermost object's
/// reference sections.
pub(crate) struct RenderPass<'p> {
    pub(crate) store: &'p dyn ObjectStore,
    pub(crate) access: &'p dyn AccessControl,
    pub(crate) user: Option<&'p User>,
    pub(crate) request: &'p RenderRequest,
    pub(crate) resolver: ReferenceResolver<'p>,
    pub(crate) path: Vec<ObjectId>,
    pub(crate) projections: BTreeMap<String, Vec<String>>,
}

impl<'p> RenderPass<'p> {
    fn new(engine: &'p RenderEngine<'_>, user: Option<&'p User>, request: &'p RenderRequest) -> Self {
        Self {
            store: engine.store,
            access: engine.access,
            user,
            request,
            resolver: ReferenceResolver::new(
                engine.store,
                engine.access,
                user,
                &engine.config.summary_separator,
            ),
            path: Vec::new(),
            projections: BTreeMap::new(),
        }
    }

    /// The resolver to attach single-hop references with, if requested
    pub(crate) fn references(&self) -> Option<&ReferenceResolver<'p>> {
        self.request.resolve_references.then_some(&self.resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AllowAllAccess;
    use crate::model::{FieldDescriptor, FieldKind, FieldSection, SectionDescriptor};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn server_type() -> Type {
        Type::new(1, "server", "Server")
            .with_field(FieldDescriptor::new("hostname", FieldKind::Text, "Hostname"))
            .with_section(SectionDescriptor::Field(FieldSection {
                name: "general".to_string(),
                label: "General".to_string(),
                fields: vec!["hostname".to_string()],
            }))
    }

    #[test]
    fn test_type_mismatch() {
        let store = MemoryStore::new();
        let engine = RenderEngine::new(&store, &AllowAllAccess);
        let object = Object::new(1, 99, 1);

        let result = engine.render(&object, &server_type(), None, &RenderRequest::default());
        assert!(matches!(
            result,
            Err(CmdbError::TypeMismatch {
                object_type_id: 99,
                type_id: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_depth_zero_renders_no_fields() {
        let store = MemoryStore::new();
        let engine = RenderEngine::new(&store, &AllowAllAccess);
        let object = Object::new(1, 1, 1).with_field("hostname", json!("web-01"));

        let result = engine
            .render(&object, &server_type(), None, &RenderRequest::new(0))
            .unwrap();

        assert!(result.fields.is_empty());
        assert_eq!(result.sections.len(), 1);
    }

    #[test]
    fn test_wrap_render_error_keeps_access_denied() {
        let denied = CmdbError::AccessDenied {
            type_id: 1,
            user_id: 1,
            permission: "read".to_string(),
        };
        assert_eq!(wrap_render_error(3, denied.clone()), denied);

        let wrapped = wrap_render_error(
            3,
            CmdbError::Store {
                message: "down".to_string(),
            },
        );
        assert!(matches!(wrapped, CmdbError::Render { object_id: 3, .. }));
    }

    #[test]
    fn test_unknown_author_label_is_configurable() {
        let store = MemoryStore::new();
        let config = EngineConfig {
            unknown_user_label: "n/a".to_string(),
            ..EngineConfig::default()
        };
        let engine = RenderEngine::new(&store, &AllowAllAccess).with_config(config);
        let object = Object::new(1, 1, 42);

        let result = engine
            .render(&object, &server_type(), None, &engine.default_request())
            .unwrap();
        assert_eq!(result.object_information.author_name, "n/a");
    }
}
