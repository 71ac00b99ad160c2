use serde::{Deserialize, Serialize};

/// One fillable form control: its identity and the human label it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
}

impl FieldDescriptor {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A field descriptor together with the generated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredField {
    #[serde(flatten)]
    pub field: FieldDescriptor,
    pub response: String,
}

impl AnsweredField {
    #[inline]
    #[must_use]
    pub fn new(field: FieldDescriptor, response: impl Into<String>) -> Self {
        Self {
            field,
            response: response.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.field.id
    }
}
