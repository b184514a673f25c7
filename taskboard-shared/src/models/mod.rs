/// Entity models for Taskboard
///
/// Every entity lives in its own document-store collection and is addressed by a
/// store-assigned [`DocumentId`] that travels on the wire as `_id`.
///
/// # Models
///
/// - `user`: Team members and their engineering role
/// - `project`: Projects with an owner and ordered participant list
/// - `task`: Work items with status and priority
/// - `comment`: Task comments stamped with a server-side creation time
/// - `schema`: Field descriptor tables used to validate partial patches
///
/// # Example
///
/// ```
/// use taskboard_shared::models::{EntityKind, user::User, Entity};
///
/// assert_eq!(User::KIND, EntityKind::User);
/// assert_eq!(EntityKind::User.collection(), "users");
/// assert!(EntityKind::User.field("email").is_some());
/// ```

pub mod comment;
pub mod project;
pub mod schema;
pub mod task;
pub mod user;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

use self::schema::FieldDescriptor;

/// A raw document body as exchanged with the document store
pub type Document = Map<String, Value>;

/// Wire name of the identifier field on every document
pub const ID_FIELD: &str = "_id";

/// Store-assigned document identifier
///
/// Identifiers are UUIDs rendered in hyphenated lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error returned when a string is not a valid identifier encoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed identifier: {0:?}")]
pub struct InvalidDocumentId(pub String);

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| InvalidDocumentId(raw.to_string()))
    }
}

/// The four entity kinds stored by Taskboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Project,
    Task,
    Comment,
}

impl EntityKind {
    /// Every entity kind, in declaration order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Project,
        EntityKind::Task,
        EntityKind::Comment,
    ];

    /// Name of the backing collection
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Project => "projects",
            EntityKind::Task => "tasks",
            EntityKind::Comment => "comments",
        }
    }

    /// Field descriptor table for this kind, excluding the identifier
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        match self {
            EntityKind::User => user::FIELDS,
            EntityKind::Project => project::FIELDS,
            EntityKind::Task => task::FIELDS,
            EntityKind::Comment => comment::FIELDS,
        }
    }

    /// Looks up a single field descriptor by its wire name
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|field| field.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// A typed entity stored in its own collection
///
/// Implementors tie a record type to its [`EntityKind`] and to the payload
/// accepted when creating a new document.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind of this entity
    const KIND: EntityKind;

    /// Client payload accepted on creation (no identifier, no server fields)
    type New: DeserializeOwned + Validate + Send + 'static;

    /// Builds the document body to insert, adding any server-assigned fields
    fn into_document(input: Self::New) -> Result<Document, serde_json::Error>;

    /// Decodes a stored document (including `_id`) into the typed record
    fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }
}

/// Serializes a value that must render as a JSON object
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
