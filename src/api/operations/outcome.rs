use crate::api::error::{WebApiError, WebApiResult};
use serde_json::Value;

/// Result of a successful operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single record (retrieve, create-and-select)
    Entity(Value),
    /// The `value` array of a list retrieval
    Entities(Vec<Value>),
    /// Id of a newly created record
    EntityId(String),
    /// Action response; `None` when the server sent no content
    Action(Option<Value>),
    NoContent,
}

impl Outcome {
    pub fn into_entity(self) -> WebApiResult<Value> {
        match self {
            Self::Entity(value) => Ok(value),
            other => Err(other.mismatch("a record")),
        }
    }

    pub fn into_entities(self) -> WebApiResult<Vec<Value>> {
        match self {
            Self::Entities(values) => Ok(values),
            other => Err(other.mismatch("a record list")),
        }
    }

    pub fn into_entity_id(self) -> WebApiResult<String> {
        match self {
            Self::EntityId(id) => Ok(id),
            other => Err(other.mismatch("a record id")),
        }
    }

    pub fn into_action_result(self) -> WebApiResult<Option<Value>> {
        match self {
            Self::Action(value) => Ok(value),
            other => Err(other.mismatch("an action result")),
        }
    }

    pub fn into_no_content(self) -> WebApiResult<()> {
        match self {
            Self::NoContent => Ok(()),
            other => Err(other.mismatch("no content")),
        }
    }

    fn mismatch(&self, expected: &str) -> WebApiError {
        WebApiError::UnexpectedPayload(format!("expected {}, got {:?}", expected, self))
    }
}
