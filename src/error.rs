//! Crate errors

use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Material,
    Entity,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Material => write!(f, "material"),
            ResourceKind::Entity => write!(f, "entity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time parameter violation. Fatal to scene setup.
    #[error("invalid parameter: {what}")]
    InvalidParameter { what: String },

    /// A lookup by name for a resource that was never built. Builder ordering
    /// determines availability, so this surfaces loudly instead of yielding
    /// an absent reference.
    #[error("{kind} not found: {name}")]
    MissingResource { kind: ResourceKind, name: String },

    /// A second resource registered under an existing name.
    #[error("{kind} name already taken: {name}")]
    DuplicateResource { kind: ResourceKind, name: String },
}

impl Error {
    pub fn invalid(what: impl Into<String>) -> Self {
        Error::InvalidParameter { what: what.into() }
    }

    pub fn missing(kind: ResourceKind, name: impl Into<String>) -> Self {
        Error::MissingResource {
            kind,
            name: name.into(),
        }
    }

    pub fn duplicate(kind: ResourceKind, name: impl Into<String>) -> Self {
        Error::DuplicateResource {
            kind,
            name: name.into(),
        }
    }
}
