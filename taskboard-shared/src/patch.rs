/// Partial patch validation
///
/// A patch names the document to change (`_id`) and zero or more declared fields
/// of its entity kind. Clients say "leave this field alone" either by omitting it
/// or by sending `null` or `""`; both become [`PatchValue::Unchanged`] before any
/// type check runs. Every other value must satisfy the field's descriptor.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskboard_shared::models::EntityKind;
/// use taskboard_shared::patch::{validate_partial, PatchValue};
///
/// let patch = validate_partial(
///     EntityKind::User,
///     &json!({
///         "_id": "5f0c6a4e-2b7d-4c1a-9e3f-1a2b3c4d5e6f",
///         "name": "",
///         "email": "ann2@x.com"
///     }),
/// )
/// .unwrap();
///
/// assert_eq!(patch.value("name"), Some(&PatchValue::Unchanged));
/// assert_eq!(patch.assignments().len(), 1);
/// ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Document, DocumentId, EntityKind, ID_FIELD};

/// Value of one field in a validated patch
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// The client sent `null` or `""`: keep the stored value
    Unchanged,

    /// Assign this value
    Set(Value),
}

impl PatchValue {
    fn from_candidate(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(PatchValue::Unchanged),
            Value::String(text) if text.is_empty() => Some(PatchValue::Unchanged),
            _ => None,
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Wire name of the offending field
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for `field`
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Patch validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// One or more fields violate their constraint
    #[error("patch validation failed: {} invalid field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// `_id` is a string but not a valid identifier encoding
    #[error("malformed identifier: {0:?}")]
    MalformedIdentifier(String),
}

/// A patch that passed validation against its entity's field table
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPatch {
    kind: EntityKind,
    id: DocumentId,
    fields: Vec<(&'static str, PatchValue)>,
}

impl ValidatedPatch {
    /// Entity kind the patch targets
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Identifier of the target document (the match key)
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Every field present in the patch, in field table order
    pub fn fields(&self) -> &[(&'static str, PatchValue)] {
        &self.fields
    }

    /// Value for a single field, if the patch mentioned it
    pub fn value(&self, name: &str) -> Option<&PatchValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// The field assignments to apply: only meaningfully present values
    ///
    /// Never contains the identifier.
    pub fn assignments(&self) -> Document {
        self.fields
            .iter()
            .filter_map(|(name, value)| match value {
                PatchValue::Set(value) => Some((name.to_string(), value.clone())),
                PatchValue::Unchanged => None,
            })
            .collect()
    }

    /// True when applying the patch cannot change anything
    pub fn is_noop(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, value)| *value == PatchValue::Unchanged)
    }
}

/// Validates a candidate patch against the partial shape of `kind`
///
/// # Errors
///
/// - [`PatchError::Validation`] when the candidate is not an object, `_id` is
///   missing or not a string, a key names no declared field, a server-assigned
///   field is set, or a value fails its type constraint. All violations are
///   reported together.
/// - [`PatchError::MalformedIdentifier`] when the fields are valid but `_id`
///   does not parse as an identifier.
pub fn validate_partial(kind: EntityKind, candidate: &Value) -> Result<ValidatedPatch, PatchError> {
    let Some(object) = candidate.as_object() else {
        return Err(PatchError::Validation(vec![FieldViolation::new(
            ID_FIELD,
            "Patch must be a JSON object",
        )]));
    };

    let mut violations = Vec::new();

    let raw_id = match object.get(ID_FIELD) {
        Some(Value::String(raw)) => Some(raw.as_str()),
        Some(_) => {
            violations.push(FieldViolation::new(ID_FIELD, "Identifier must be a string"));
            None
        }
        None => {
            violations.push(FieldViolation::new(ID_FIELD, "Identifier is required"));
            None
        }
    };

    for key in object.keys() {
        if key != ID_FIELD && kind.field(key).is_none() {
            violations.push(FieldViolation::new(
                key.as_str(),
                format!("Unknown field for {kind}"),
            ));
        }
    }

    let mut fields = Vec::new();
    for descriptor in kind.fields() {
        let Some(value) = object.get(descriptor.name) else {
            continue;
        };

        if let Some(unchanged) = PatchValue::from_candidate(value) {
            fields.push((descriptor.name, unchanged));
            continue;
        }

        if !descriptor.mutable {
            violations.push(FieldViolation::new(
                descriptor.name,
                "Field is assigned by the server and cannot be updated",
            ));
            continue;
        }

        match descriptor.kind.check(value) {
            Ok(()) => fields.push((descriptor.name, PatchValue::Set(value.clone()))),
            Err(message) => violations.push(FieldViolation::new(descriptor.name, message)),
        }
    }

    let raw_id = match raw_id {
        Some(raw) if violations.is_empty() => raw,
        _ => return Err(PatchError::Validation(violations)),
    };

    let id = raw_id
        .parse::<DocumentId>()
        .map_err(|err| PatchError::MalformedIdentifier(err.0))?;

    Ok(ValidatedPatch { kind, id, fields })
}

/// Checks a complete document body about to be inserted against `kind`
///
/// Creation payloads are typed, so this only re-applies the value constraints
/// of the field table (storable text, email syntax, enum vocabularies) to the
/// encoded body. Keys without a descriptor are ignored.
///
/// # Errors
///
/// [`PatchError::Validation`] listing every field that fails its constraint.
pub fn validate_document(kind: EntityKind, document: &Document) -> Result<(), PatchError> {
    let violations: Vec<FieldViolation> = kind
        .fields()
        .iter()
        .filter_map(|descriptor| {
            let value = document.get(descriptor.name)?;
            descriptor
                .kind
                .check(value)
                .err()
                .map(|message| FieldViolation::new(descriptor.name, message))
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PatchError::Validation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "5f0c6a4e-2b7d-4c1a-9e3f-1a2b3c4d5e6f";

    fn violations(err: PatchError) -> Vec<FieldViolation> {
        match err {
            PatchError::Validation(violations) => violations,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_identifier_is_never_an_assignment() {
        let patch = validate_partial(EntityKind::User, &json!({ "_id": ID, "name": "Bo" })).unwrap();

        assert_eq!(patch.id().to_string(), ID);
        let assignments = patch.assignments();
        assert!(!assignments.contains_key(ID_FIELD));
        assert_eq!(assignments.get("name"), Some(&json!("Bo")));
    }

    #[test]
    fn test_null_and_empty_string_mean_unchanged() {
        let patch = validate_partial(
            EntityKind::Task,
            &json!({ "_id": ID, "title": null, "description": "", "assignedTo": "u9" }),
        )
        .unwrap();

        assert_eq!(patch.value("title"), Some(&PatchValue::Unchanged));
        assert_eq!(patch.value("description"), Some(&PatchValue::Unchanged));
        assert_eq!(patch.value("deadline"), None);
        assert_eq!(patch.assignments().len(), 1);
        assert!(!patch.is_noop());
    }

    #[test]
    fn test_sentinel_skips_enum_check() {
        let patch = validate_partial(
            EntityKind::Task,
            &json!({ "_id": ID, "status": "", "priority": null }),
        )
        .unwrap();

        assert!(patch.is_noop());
        assert!(patch.assignments().is_empty());
    }

    #[test]
    fn test_identifier_only_patch_is_noop() {
        let patch = validate_partial(EntityKind::Project, &json!({ "_id": ID })).unwrap();
        assert!(patch.fields().is_empty());
        assert!(patch.is_noop());
    }

    #[test]
    fn test_invalid_enum_is_rejected() {
        let err = validate_partial(EntityKind::Task, &json!({ "_id": ID, "status": "archived" }))
            .unwrap_err();

        let violations = violations(err);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "status");
        assert!(violations[0].message.contains("in-progress"));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let err = validate_partial(
            EntityKind::User,
            &json!({ "name": 7, "email": "nope", "role": "manager", "age": 30 }),
        )
        .unwrap_err();

        let mut fields: Vec<_> = violations(err).into_iter().map(|v| v.field).collect();
        fields.sort();
        assert_eq!(fields, vec!["_id", "age", "email", "name", "role"]);
    }

    #[test]
    fn test_malformed_identifier() {
        let err = validate_partial(EntityKind::Comment, &json!({ "_id": "abc", "content": "x" }))
            .unwrap_err();
        assert_eq!(err, PatchError::MalformedIdentifier("abc".to_string()));
    }

    #[test]
    fn test_validation_errors_win_over_malformed_identifier() {
        let err = validate_partial(EntityKind::Task, &json!({ "_id": "abc", "priority": "urgent" }))
            .unwrap_err();
        assert_eq!(violations(err)[0].field, "priority");
    }

    #[test]
    fn test_non_string_identifier() {
        let err = validate_partial(EntityKind::User, &json!({ "_id": 12 })).unwrap_err();
        assert_eq!(violations(err)[0].message, "Identifier must be a string");
    }

    #[test]
    fn test_non_object_patch() {
        let err = validate_partial(EntityKind::User, &json!(["_id"])).unwrap_err();
        assert_eq!(violations(err).len(), 1);
    }

    #[test]
    fn test_created_at_cannot_be_patched() {
        let err = validate_partial(
            EntityKind::Comment,
            &json!({ "_id": ID, "createdAt": "2000-01-01T00:00:00.000Z" }),
        )
        .unwrap_err();
        assert_eq!(violations(err)[0].field, "createdAt");

        // The sentinel is still accepted and changes nothing
        let patch =
            validate_partial(EntityKind::Comment, &json!({ "_id": ID, "createdAt": null })).unwrap();
        assert!(patch.assignments().is_empty());
    }

    #[test]
    fn test_empty_participant_list_is_an_assignment() {
        let patch =
            validate_partial(EntityKind::Project, &json!({ "_id": ID, "participants": [] })).unwrap();
        assert_eq!(patch.assignments().get("participants"), Some(&json!([])));
    }

    #[test]
    fn test_same_engine_serves_every_kind() {
        let samples = [
            (EntityKind::User, json!({ "_id": ID, "role": "frontend" })),
            (EntityKind::Project, json!({ "_id": ID, "ownerId": "u1" })),
            (EntityKind::Task, json!({ "_id": ID, "priority": "low" })),
            (EntityKind::Comment, json!({ "_id": ID, "content": "edited" })),
        ];

        for (kind, candidate) in samples {
            let patch = validate_partial(kind, &candidate).unwrap();
            assert_eq!(patch.kind(), kind);
            assert_eq!(patch.assignments().len(), 1);
        }
    }

    #[test]
    fn test_nul_in_text_is_a_violation() {
        let err = validate_partial(
            EntityKind::User,
            &json!({ "_id": ID, "name": "A\u{0}nn" }),
        )
        .unwrap_err();

        let violations = violations(err);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");

        let err = validate_partial(
            EntityKind::Project,
            &json!({ "_id": ID, "participants": ["u1", "\u{0}"] }),
        )
        .unwrap_err();
        assert_eq!(self::violations(err)[0].field, "participants");
    }

    #[test]
    fn test_null_role_leaves_user_role_unchanged() {
        let patch = validate_partial(
            EntityKind::User,
            &json!({ "_id": ID, "role": null, "email": "ann@x.com" }),
        )
        .unwrap();

        assert_eq!(patch.value("role"), Some(&PatchValue::Unchanged));
        assert!(!patch.assignments().contains_key("role"));
        assert_eq!(patch.assignments().len(), 1);
    }

    #[test]
    fn test_validate_document() {
        let body = json!({ "taskId": "t1", "authorId": "u1", "content": "ok", "createdAt": "2024-03-01T12:30:00.000Z" });
        assert!(validate_document(EntityKind::Comment, body.as_object().unwrap()).is_ok());

        let body = json!({ "taskId": "t1", "authorId": "u\u{0}1", "content": "x\u{0}" });
        let mut fields: Vec<_> = violations(
            validate_document(EntityKind::Comment, body.as_object().unwrap()).unwrap_err(),
        )
        .into_iter()
        .map(|v| v.field)
        .collect();
        fields.sort();
        assert_eq!(fields, vec!["authorId", "content"]);
    }
}
