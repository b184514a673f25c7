/// Field descriptor tables
///
/// Each entity kind publishes a static table mapping field names to a type
/// constraint. The partial update engine validates patches against these
/// tables instead of carrying per-entity validation code.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskboard_shared::models::schema::FieldKind;
///
/// let status = FieldKind::OneOf(&["todo", "in-progress", "done"]);
/// assert!(status.check(&json!("done")).is_ok());
/// assert!(status.check(&json!("archived")).is_err());
/// ```

use serde_json::Value;
use validator::ValidateEmail;

/// Type constraint for a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any string
    Text,

    /// A syntactically valid email address
    Email,

    /// One of a fixed set of string variants
    OneOf(&'static [&'static str]),

    /// An ordered list of strings (may be empty)
    TextList,
}

impl FieldKind {
    /// Checks a present, non-sentinel value against this constraint
    ///
    /// Returns a human-readable message on failure.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (FieldKind::Text, Value::String(text)) => storable(text),
            (FieldKind::Email, Value::String(email)) => {
                storable(email)?;
                if email.validate_email() {
                    Ok(())
                } else {
                    Err("Invalid email address".to_string())
                }
            }
            (FieldKind::OneOf(variants), Value::String(variant))
                if variants.contains(&variant.as_str()) =>
            {
                Ok(())
            }
            (FieldKind::OneOf(variants), _) => {
                Err(format!("Expected one of: {}", variants.join(", ")))
            }
            (FieldKind::TextList, Value::Array(items)) => items
                .iter()
                .try_for_each(|item| match item {
                    Value::String(text) => storable(text),
                    _ => Err("Expected a list of strings".to_string()),
                }),
            (FieldKind::TextList, _) => Err("Expected a list of strings".to_string()),
            (_, _) => Err("Expected a string".to_string()),
        }
    }
}

/// PostgreSQL JSONB cannot hold U+0000, so no adapter accepts it
fn storable(text: &str) -> Result<(), String> {
    if text.contains('\0') {
        Err("Text must not contain NUL characters".to_string())
    } else {
        Ok(())
    }
}

/// Describes one declared field of an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire name of the field
    pub name: &'static str,

    /// Type constraint
    pub kind: FieldKind,

    /// Whether clients may change the field after creation
    ///
    /// Server-assigned fields such as `createdAt` are immutable.
    pub mutable: bool,
}

impl FieldDescriptor {
    /// A client-writable field
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            mutable: true,
        }
    }

    /// A field set once by the server and never updated
    pub const fn server_assigned(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            mutable: false,
        }
    }
}
