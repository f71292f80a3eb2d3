use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub type EntityId = i64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Duplicate(String),
}

impl ValidationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Capability set shared by every record a repository can own.
///
/// The repository assigns `id` and timestamps; implementors supply the
/// construction and mutation rules for their own fields.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Singular name used in error messages, e.g. `"user"`.
    const KIND: &'static str;
    /// Path segment under `/api`, e.g. `"users"`.
    const COLLECTION: &'static str;
    /// Whether the records carry a `user_id` and support user-scoped queries.
    const USER_SCOPED: bool = false;

    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    fn build(id: EntityId, input: Self::Create, now: DateTime<Utc>)
        -> Result<Self, ValidationError>;

    fn apply(&mut self, update: Self::Update) -> Result<(), ValidationError>;

    fn id(&self) -> EntityId;

    fn owner_id(&self) -> Option<EntityId> {
        None
    }

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Bump `updated_at`, never below `created_at`.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Uniqueness rule checked against every other stored record.
    fn check_unique(&self, _other: &Self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Body of `PUT` for kinds whose only mutable field is `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate<S> {
    pub status: S,
}

pub(crate) fn require_positive(field: &str, value: EntityId) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::invalid(format!("{field} must be positive")));
    }
    Ok(())
}

pub(crate) fn require_amount(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid("amount must be a non-negative number"));
    }
    Ok(())
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(format!("{field} empty")));
    }
    Ok(())
}
