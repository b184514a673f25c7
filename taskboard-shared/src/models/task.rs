/// Task model
///
/// Tasks belong to a project and are assigned to a user. Status and priority
/// are closed vocabularies.
///
/// # Status
///
/// ```text
/// todo → in-progress → done
/// ```
///
/// Transitions are not enforced; any status may be written at any time.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{TaskPriority, TaskStatus};
///
/// assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
/// assert_eq!(TaskPriority::High.as_str(), "high");
/// ```

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schema::{FieldDescriptor, FieldKind};
use super::{to_document, Document, DocumentId, Entity, EntityKind};

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Wire names of every variant
    pub const VARIANTS: &'static [&'static str] = &["todo", "in-progress", "done"];

    /// Converts status to its wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Wire names of every variant
    pub const VARIANTS: &'static [&'static str] = &["low", "medium", "high"];

    /// Converts priority to its wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Field table for the `tasks` collection
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("title", FieldKind::Text),
    FieldDescriptor::new("description", FieldKind::Text),
    FieldDescriptor::new("projectId", FieldKind::Text),
    FieldDescriptor::new("assignedTo", FieldKind::Text),
    FieldDescriptor::new("status", FieldKind::OneOf(TaskStatus::VARIANTS)),
    FieldDescriptor::new("priority", FieldKind::OneOf(TaskPriority::VARIANTS)),
    FieldDescriptor::new("deadline", FieldKind::Text),
];

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: DocumentId,

    /// Short title
    pub title: String,

    /// Longer description
    pub description: String,

    /// Owning project identifier
    pub project_id: String,

    /// Assignee user identifier
    pub assigned_to: String,

    /// Progress status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Deadline as a date string
    pub deadline: String,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub project_id: String,
    pub assigned_to: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: String,
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;
    type New = NewTask;

    fn into_document(input: NewTask) -> Result<Document, serde_json::Error> {
        to_document(&input)
    }
}
