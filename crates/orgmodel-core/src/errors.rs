use orgmodel_core_types::RequestId;
use thiserror::Error;

/// Result type alias using OrgError
pub type Result<T> = std::result::Result<T, OrgError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that callers, tests and the CLI can match
/// on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidLocale,
    InvalidCurrency,
    NotFound,
    NotAGuild,

    // Localization
    MissingText,

    // Finance
    CurrencyMismatch,

    // Identity and integrity
    UnassignedIdentity,
    IdentityAlreadyAssigned,
    UniqueViolation,
    ForeignKeyViolation,
    ConstraintViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidLocale => "ERR_INVALID_LOCALE",
            ExErrorKind::InvalidCurrency => "ERR_INVALID_CURRENCY",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::NotAGuild => "ERR_NOT_A_GUILD",
            ExErrorKind::MissingText => "ERR_MISSING_TEXT",
            ExErrorKind::CurrencyMismatch => "ERR_CURRENCY_MISMATCH",
            ExErrorKind::UnassignedIdentity => "ERR_UNASSIGNED_IDENTITY",
            ExErrorKind::IdentityAlreadyAssigned => "ERR_IDENTITY_ALREADY_ASSIGNED",
            ExErrorKind::UniqueViolation => "ERR_UNIQUE_VIOLATION",
            ExErrorKind::ForeignKeyViolation => "ERR_FOREIGN_KEY_VIOLATION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context (operation, entity, constraint,
/// correlation ids). The persistence layer reports everything through this type.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    entity_id: Option<String>,
    constraint: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            entity_id: None,
            constraint: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context (e.g. "Membership")
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add entity id context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the name of the violated constraint
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Tag the error with the invocation it was raised in
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

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

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

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
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(constraint) = &self.constraint {
            write!(f, " (constraint: {})", constraint)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the organisation model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrgError {
    // ===== Localization =====
    /// A required text lookup found nothing; the stored data is incomplete
    #[error("TextSuite [{suite}] lacks classification [{classifier}] for locale [{locale}]. This implies a data/database error.")]
    MissingText {
        suite: String,
        classifier: String,
        locale: String,
    },

    /// Locale tag could not be parsed
    #[error("Invalid locale: {tag}")]
    InvalidLocale { tag: String },

    // ===== Finance =====
    /// Amounts in different currencies have no ordering
    #[error("Cannot compare amounts in different currencies. [{left} <--> {right}]")]
    CurrencyMismatch { left: String, right: String },

    /// Currency code is not a three-letter ISO 4217 code
    #[error("Invalid currency code: {code}")]
    InvalidCurrency { code: String },

    // ===== Identity =====
    /// An entity that must already be persisted has no identity
    #[error("{entity} has no identity; it must be persisted first")]
    UnassignedIdentity { entity: &'static str },

    /// Identities are assigned exactly once
    #[error("{entity} already has identity {id}")]
    IdentityAlreadyAssigned { entity: &'static str, id: i64 },

    // ===== Store integrity =====
    /// Entity not found in store
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Another stored row already holds the same unique key
    #[error("Unique constraint {constraint} violated by {entity} [{key}]")]
    UniqueViolation {
        constraint: &'static str,
        entity: &'static str,
        key: String,
    },

    /// A referenced entity is not stored
    #[error("Foreign key {constraint} violated: {entity} {id} is not stored")]
    ForeignKeyViolation {
        constraint: &'static str,
        entity: &'static str,
        id: i64,
    },

    // ===== Validation =====
    /// Guild-only operation attempted on a plain group
    #[error("Group {group} is not a guild")]
    NotAGuild { group: String },

    /// Generic field validation failure
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Generic Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OrgError {
    /// Shorthand for [`OrgError::InvalidInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        OrgError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Conversion from OrgError to ExError
impl From<OrgError> for ExError {
    fn from(err: OrgError) -> Self {
        let message = err.to_string();
        match err {
            OrgError::MissingText { suite, .. } => ExError::new(ExErrorKind::MissingText)
                .with_op("required_text")
                .with_entity("TextSuite")
                .with_entity_id(suite)
                .with_message(message),
            OrgError::InvalidLocale { .. } => {
                ExError::new(ExErrorKind::InvalidLocale).with_message(message)
            }
            OrgError::CurrencyMismatch { .. } => ExError::new(ExErrorKind::CurrencyMismatch)
                .with_op("compare_amounts")
                .with_message(message),
            OrgError::InvalidCurrency { .. } => {
                ExError::new(ExErrorKind::InvalidCurrency).with_message(message)
            }
            OrgError::UnassignedIdentity { entity } => {
                ExError::new(ExErrorKind::UnassignedIdentity)
                    .with_entity(entity)
                    .with_message(message)
            }
            OrgError::IdentityAlreadyAssigned { entity, id } => {
                ExError::new(ExErrorKind::IdentityAlreadyAssigned)
                    .with_entity(entity)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }
            OrgError::NotFound { entity, id } => ExError::new(ExErrorKind::NotFound)
                .with_entity(entity)
                .with_entity_id(id)
                .with_message(message),
            OrgError::UniqueViolation {
                constraint, entity, ..
            } => ExError::new(ExErrorKind::UniqueViolation)
                .with_entity(entity)
                .with_constraint(constraint)
                .with_message(message),
            OrgError::ForeignKeyViolation {
                constraint,
                entity,
                id,
            } => ExError::new(ExErrorKind::ForeignKeyViolation)
                .with_entity(entity)
                .with_entity_id(id.to_string())
                .with_constraint(constraint)
                .with_message(message),
            OrgError::NotAGuild { group } => ExError::new(ExErrorKind::NotAGuild)
                .with_entity("Group")
                .with_entity_id(group)
                .with_message(message),
            OrgError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            OrgError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            OrgError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}
