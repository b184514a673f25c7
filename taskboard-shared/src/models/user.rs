/// User model
///
/// Users are team members. Each carries an engineering role that must be one of
/// the declared [`Role`] variants.
///
/// # Document
///
/// ```json
/// {
///   "_id": "5f0c6a4e-2b7d-4c1a-9e3f-1a2b3c4d5e6f",
///   "name": "Ann",
///   "email": "ann@example.com",
///   "role": "backend"
/// }
/// ```
///
/// # Example
///
/// ```
/// use taskboard_shared::models::{user::{NewUser, Role, User}, Entity};
///
/// let body = User::into_document(NewUser {
///     name: "Ann".to_string(),
///     email: "ann@example.com".to_string(),
///     role: Role::Backend,
/// })
/// .unwrap();
///
/// assert_eq!(body["role"], "backend");
/// assert!(!body.contains_key("_id"));
/// ```

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schema::{FieldDescriptor, FieldKind};
use super::{to_document, Document, DocumentId, Entity, EntityKind};

/// Engineering role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Frontend,
    Backend,
    Fullstack,
}

impl Role {
    /// Wire names of every variant
    pub const VARIANTS: &'static [&'static str] = &["frontend", "backend", "fullstack"];

    /// Converts role to its wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Frontend => "frontend",
            Role::Backend => "backend",
            Role::Fullstack => "fullstack",
        }
    }
}

/// Field table for the `users` collection
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", FieldKind::Text),
    FieldDescriptor::new("email", FieldKind::Email),
    FieldDescriptor::new("role", FieldKind::OneOf(Role::VARIANTS)),
];

/// A stored user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: DocumentId,

    /// Display name
    pub name: String,

    /// Contact email address
    pub email: String,

    /// Engineering role
    pub role: Role,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    /// Display name
    pub name: String,

    /// Contact email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Engineering role
    pub role: Role,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type New = NewUser;

    fn into_document(input: NewUser) -> Result<Document, serde_json::Error> {
        to_document(&input)
    }
}
