/// Project model
///
/// A project has one owner and an ordered list of participants. Both are plain
/// user identifier strings; nothing checks that the users exist.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schema::{FieldDescriptor, FieldKind};
use super::{to_document, Document, DocumentId, Entity, EntityKind};

/// Field table for the `projects` collection
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", FieldKind::Text),
    FieldDescriptor::new("description", FieldKind::Text),
    FieldDescriptor::new("ownerId", FieldKind::Text),
    FieldDescriptor::new("participants", FieldKind::TextList),
    FieldDescriptor::new("deadline", FieldKind::Text),
];

/// A stored project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub description: String,
    pub owner_id: String,

    /// Participant user identifiers, in the order they were given
    pub participants: Vec<String>,

    /// Deadline as a date string
    pub deadline: String,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub participants: Vec<String>,
    pub deadline: String,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    type New = NewProject;

    fn into_document(input: NewProject) -> Result<Document, serde_json::Error> {
        to_document(&input)
    }
}
