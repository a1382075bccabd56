use cmdb_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{ObjectId, TypeId, UserId};

/// Result type alias using CmdbError
pub type Result<T> = std::result::Result<T, CmdbError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (the HTTP layer, audit
/// logging, tests) can match on without depending on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,

    // Security
    AccessDenied,

    // Structural/Data
    TypeMismatch,
    FieldResolution,
    SectionResolution,
    Interpolation,

    // Orchestration
    Render,

    // Integration/IO
    Persistence,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AccessDenied => "ERR_ACCESS_DENIED",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::FieldResolution => "ERR_FIELD_RESOLUTION",
            ExErrorKind::SectionResolution => "ERR_SECTION_RESOLUTION",
            ExErrorKind::Interpolation => "ERR_INTERPOLATION",
            ExErrorKind::Render => "ERR_RENDER",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and correlation
/// context for debugging. Built from a [`CmdbError`] via `From`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (object, type or user id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for render and reference-resolution operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CmdbError {
    // ===== Lookup Errors =====
    /// Object not found in store
    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: ObjectId },

    /// Type not found in store
    #[error("Type not found: {type_id}")]
    TypeNotFound { type_id: TypeId },

    /// User not found (or deleted)
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    /// A section name does not exist on the given type
    #[error("Section {section} not found on type {type_id}")]
    SectionNotFound { type_id: TypeId, section: String },

    /// A field name is not declared on the given type
    #[error("Field {field} not declared on type {type_id}")]
    FieldNotFound { type_id: TypeId, field: String },

    // ===== Security Errors =====
    /// The requesting user lacks the permission on the type
    #[error("Access denied: user {user_id} lacks {permission} on type {type_id}")]
    AccessDenied {
        type_id: TypeId,
        user_id: UserId,
        permission: String,
    },

    // ===== Structural Errors =====
    /// Object rendered against a type it does not belong to
    #[error("Object {object_id} has type {object_type_id}, not {type_id}")]
    TypeMismatch {
        object_id: ObjectId,
        object_type_id: TypeId,
        type_id: TypeId,
    },

    /// A single field could not be merged
    #[error("Field {field} could not be resolved: {reason}")]
    FieldResolution { field: String, reason: String },

    /// A reference section could not be resolved
    #[error("Section {section} could not be resolved: {reason}")]
    SectionResolution { section: String, reason: String },

    /// A template could not be filled from the supplied values
    #[error("Template '{template}' could not be interpolated: {reason}")]
    Interpolation { template: String, reason: String },

    // ===== Orchestration Errors =====
    /// Top-level render failure wrapping the root cause
    #[error("Render of object {object_id} failed: {cause}")]
    Render {
        object_id: ObjectId,
        cause: Box<CmdbError>,
    },

    // ===== Integration Errors =====
    /// Storage backend failure (not an absence)
    #[error("Store error: {message}")]
    Store { message: String },

    /// Engine configuration could not be parsed
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CmdbError {
    /// Whether the render engine absorbs this error locally.
    ///
    /// Absent data, per-field and per-section failures and interpolation
    /// failures degrade the projection; everything else surfaces.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CmdbError::ObjectNotFound { .. }
                | CmdbError::TypeNotFound { .. }
                | CmdbError::UserNotFound { .. }
                | CmdbError::SectionNotFound { .. }
                | CmdbError::FieldNotFound { .. }
                | CmdbError::FieldResolution { .. }
                | CmdbError::SectionResolution { .. }
                | CmdbError::Interpolation { .. }
        )
    }

    /// Whether this is a security error that must never be swallowed
    pub fn is_access_denied(&self) -> bool {
        matches!(self, CmdbError::AccessDenied { .. })
    }

    /// Root cause for wrapped render errors, `self` otherwise
    pub fn root_cause(&self) -> &CmdbError {
        match self {
            CmdbError::Render { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

/// Conversion from CmdbError to ExError
impl From<CmdbError> for ExError {
    fn from(err: CmdbError) -> Self {
        match err {
            CmdbError::ObjectNotFound { object_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(object_id.to_string())
                .with_message("Object not found"),

            CmdbError::TypeNotFound { type_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(type_id.to_string())
                .with_message("Type not found"),

            CmdbError::UserNotFound { user_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(user_id.to_string())
                .with_message("User not found"),

            CmdbError::SectionNotFound { type_id, section } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(type_id.to_string())
                .with_message(format!("Section {} not found", section)),

            CmdbError::FieldNotFound { type_id, field } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(type_id.to_string())
                .with_message(format!("Field {} not declared", field)),

            CmdbError::AccessDenied {
                type_id,
                user_id,
                permission,
            } => ExError::new(ExErrorKind::AccessDenied)
                .with_entity_id(type_id.to_string())
                .with_message(format!("User {} lacks {} permission", user_id, permission)),

            CmdbError::TypeMismatch {
                object_id,
                object_type_id,
                type_id,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_entity_id(object_id.to_string())
                .with_message(format!(
                    "Object has type {} but was rendered with type {}",
                    object_type_id, type_id
                )),

            CmdbError::FieldResolution { field, reason } => {
                ExError::new(ExErrorKind::FieldResolution)
                    .with_message(format!("Field {}: {}", field, reason))
            }

            CmdbError::SectionResolution { section, reason } => {
                ExError::new(ExErrorKind::SectionResolution)
                    .with_message(format!("Section {}: {}", section, reason))
            }

            CmdbError::Interpolation { template, reason } => {
                ExError::new(ExErrorKind::Interpolation)
                    .with_message(format!("Template '{}': {}", template, reason))
            }

            CmdbError::Render { object_id, cause } => ExError::new(ExErrorKind::Render)
                .with_op("render")
                .with_entity_id(object_id.to_string())
                .with_message("Render failed")
                .with_source(ExError::from(*cause)),

            CmdbError::Store { message } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }

            CmdbError::Config { message } => ExError::new(ExErrorKind::Config).with_message(message),

            CmdbError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to CmdbError
impl From<serde_json::Error> for CmdbError {
    fn from(err: serde_json::Error) -> Self {
        CmdbError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to CmdbError
impl From<toml::de::Error> for CmdbError {
    fn from(err: toml::de::Error) -> Self {
        CmdbError::Config {
            message: err.to_string(),
        }
    }
}
