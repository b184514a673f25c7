/// Comment model
///
/// Comments are attached to a task. `createdAt` is stamped from the server clock
/// when the comment is inserted and is never touched again; the field table
/// marks it server-assigned so patches cannot set it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schema::{FieldDescriptor, FieldKind};
use super::{to_document, Document, DocumentId, Entity, EntityKind};

/// Field table for the `comments` collection
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("taskId", FieldKind::Text),
    FieldDescriptor::new("authorId", FieldKind::Text),
    FieldDescriptor::new("content", FieldKind::Text),
    FieldDescriptor::server_assigned("createdAt", FieldKind::Text),
];

/// A stored comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub task_id: String,
    pub author_id: String,
    pub content: String,

    /// RFC 3339 creation timestamp (UTC, millisecond precision)
    pub created_at: String,
}

/// Input for creating a new comment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewComment {
    pub task_id: String,
    pub author_id: String,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StampedComment {
    #[serde(flatten)]
    input: NewComment,
    created_at: String,
}

impl Comment {
    /// Builds the document body for a comment created at `now`
    pub fn stamp(input: NewComment, now: DateTime<Utc>) -> Result<Document, serde_json::Error> {
        to_document(&StampedComment {
            input,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

impl Entity for Comment {
    const KIND: EntityKind = EntityKind::Comment;
    type New = NewComment;

    fn into_document(input: NewComment) -> Result<Document, serde_json::Error> {
        Comment::stamp(input, Utc::now())
    }
}
