use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity, EntityId, ValidationError};

pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

/// Exactly one `@`, neither first nor last.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut ats = email.match_indices('@');
    match (ats.next(), ats.next()) {
        (Some((idx, _)), None) if idx > 0 && idx + 1 < email.len() => Ok(()),
        (Some(_), None) => Err(ValidationError::invalid(
            "invalid email: @ must not be at the beginning or end",
        )),
        _ => Err(ValidationError::invalid(
            "invalid email: must contain exactly one @ character",
        )),
    }
}

fn validate_age(age: u32) -> Result<(), ValidationError> {
    if age > MAX_AGE {
        return Err(ValidationError::invalid(format!(
            "age must be between 0 and {MAX_AGE}"
        )));
    }
    Ok(())
}

impl Entity for User {
    const KIND: &'static str = "user";
    const COLLECTION: &'static str = "users";

    type Create = NewUser;
    type Update = UserChanges;

    fn build(id: EntityId, input: NewUser, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        require_text("first_name", &input.first_name)?;
        require_text("last_name", &input.last_name)?;
        validate_email(&input.email)?;
        validate_age(input.age)?;
        Ok(Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            age: input.age,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, changes: UserChanges) -> Result<(), ValidationError> {
        if let Some(first_name) = changes.first_name {
            require_text("first_name", &first_name)?;
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            require_text("last_name", &last_name)?;
            self.last_name = last_name;
        }
        if let Some(email) = changes.email {
            if email != self.email {
                validate_email(&email)?;
                self.email = email;
            }
        }
        if let Some(age) = changes.age {
            validate_age(age)?;
            self.age = age;
        }
        Ok(())
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    fn check_unique(&self, other: &Self) -> Result<(), ValidationError> {
        if other.id != self.id && other.email == self.email {
            return Err(ValidationError::Duplicate("email already exists".into()));
        }
        Ok(())
    }
}
