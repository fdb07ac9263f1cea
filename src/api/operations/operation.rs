//! Core Operation types for Dynamics CRM Web API calls

use crate::api::constants::{self, headers};
use crate::api::error::{WebApiError, WebApiResult};
use crate::api::executor::Exchange;
use crate::api::models::{EntityReference, ServiceEndpoint, strip_braces};
use crate::api::request::{RequestDescriptor, SuccessPredicate};
use crate::config::ClientSettings;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::outcome::Outcome;

static ENTITY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("entity id pattern is valid"));

/// A single Web API call, independent of how it is dispatched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Retrieve one record
    Retrieve { entity: EntityReference },
    /// Retrieve one page of records for a query such as `accounts?$select=name`
    RetrieveMultiple {
        query: String,
        /// Overrides the client's configured page size for this call
        max_page_size: Option<u32>,
    },
    /// Create a record; yields the new id
    Create { entity_set: String, data: Value },
    /// Create a record and read back selected columns
    CreateAndSelect {
        entity_set: String,
        data: Value,
        /// Query string without the leading `?`, defaults to `$select=createdon`
        select: Option<String>,
    },
    Update { entity: EntityReference, data: Value },
    Delete { entity: EntityReference },
    /// Add `child` to a collection-valued navigation property of `parent`
    Associate {
        parent: EntityReference,
        relationship: String,
        child: EntityReference,
    },
    /// Remove one member from a collection-valued navigation property
    Disassociate {
        parent: EntityReference,
        relationship: String,
        child_id: String,
    },
    /// Clear a single-valued navigation property (lookup)
    DisassociateLookup {
        parent: EntityReference,
        relationship: String,
    },
    CallUnboundAction { action: String, payload: Option<Value> },
    CallBoundAction {
        entity: EntityReference,
        action: String,
        payload: Option<Value>,
    },
}

impl Operation {
    pub fn retrieve(entity_set: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Retrieve {
            entity: EntityReference::new(entity_set, id),
        }
    }

    pub fn retrieve_multiple(query: impl Into<String>) -> Self {
        Self::RetrieveMultiple {
            query: query.into(),
            max_page_size: None,
        }
    }

    pub fn retrieve_multiple_with_page_size(query: impl Into<String>, max_page_size: u32) -> Self {
        Self::RetrieveMultiple {
            query: query.into(),
            max_page_size: Some(max_page_size),
        }
    }

    pub fn create(entity_set: impl Into<String>, data: Value) -> Self {
        Self::Create {
            entity_set: entity_set.into(),
            data,
        }
    }

    pub fn create_and_select(entity_set: impl Into<String>, data: Value, select: Option<String>) -> Self {
        Self::CreateAndSelect {
            entity_set: entity_set.into(),
            data,
            select,
        }
    }

    pub fn update(entity_set: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Self::Update {
            entity: EntityReference::new(entity_set, id),
            data,
        }
    }

    pub fn delete(entity_set: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            entity: EntityReference::new(entity_set, id),
        }
    }

    pub fn associate(parent: EntityReference, relationship: impl Into<String>, child: EntityReference) -> Self {
        Self::Associate {
            parent,
            relationship: relationship.into(),
            child,
        }
    }

    pub fn disassociate(
        parent: EntityReference,
        relationship: impl Into<String>,
        child_id: impl Into<String>,
    ) -> Self {
        Self::Disassociate {
            parent,
            relationship: relationship.into(),
            child_id: child_id.into(),
        }
    }

    pub fn disassociate_lookup(parent: EntityReference, relationship: impl Into<String>) -> Self {
        Self::DisassociateLookup {
            parent,
            relationship: relationship.into(),
        }
    }

    pub fn call_unbound_action(action: impl Into<String>, payload: Option<Value>) -> Self {
        Self::CallUnboundAction {
            action: action.into(),
            payload,
        }
    }

    pub fn call_bound_action(
        entity_set: impl Into<String>,
        id: impl Into<String>,
        action: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self::CallBoundAction {
            entity: EntityReference::new(entity_set, id),
            action: action.into(),
            payload,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Retrieve { .. } => "retrieve",
            Self::RetrieveMultiple { .. } => "retrieve_multiple",
            Self::Create { .. } => "create",
            Self::CreateAndSelect { .. } => "create_and_select",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Associate { .. } => "associate",
            Self::Disassociate { .. } => "disassociate",
            Self::DisassociateLookup { .. } => "disassociate_lookup",
            Self::CallUnboundAction { .. } => "call_unbound_action",
            Self::CallBoundAction { .. } => "call_bound_action",
        }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> Method {
        match self {
            Self::Retrieve { .. } | Self::RetrieveMultiple { .. } => Method::GET,
            Self::Create { .. }
            | Self::CreateAndSelect { .. }
            | Self::Associate { .. }
            | Self::CallUnboundAction { .. }
            | Self::CallBoundAction { .. } => Method::POST,
            Self::Update { .. } => Method::PATCH,
            Self::Delete { .. } | Self::Disassociate { .. } | Self::DisassociateLookup { .. } => {
                Method::DELETE
            }
        }
    }

    /// Describe the exchange for this operation against `endpoint`
    pub fn descriptor(&self, endpoint: &ServiceEndpoint, settings: &ClientSettings) -> RequestDescriptor {
        let base = endpoint.as_str();
        let method = self.http_method();

        match self {
            Self::Retrieve { entity } => RequestDescriptor::new(
                method,
                constants::entity_record_endpoint(base, &entity.entity_set, &entity.path_id()),
            )
            .header(headers::PREFER, headers::PREFER_INCLUDE_ANNOTATIONS)
            .parse_body(true),

            Self::RetrieveMultiple { query, max_page_size } => {
                // Zero means no override
                let page_size = max_page_size.filter(|n| *n > 0).unwrap_or(settings.max_page_size);
                RequestDescriptor::new(method, constants::entity_set_endpoint(base, query))
                    .header(headers::PREFER, headers::prefer_max_page_size(page_size))
                    .parse_body(true)
            }

            Self::Create { entity_set, data } => {
                RequestDescriptor::new(method, constants::entity_set_endpoint(base, entity_set))
                    .payload(Some(data.clone()))
                    .success(SuccessPredicate::NO_CONTENT)
            }

            Self::CreateAndSelect {
                entity_set,
                data,
                select,
            } => {
                let select = select.as_deref().unwrap_or(constants::DEFAULT_CREATE_SELECT);
                RequestDescriptor::new(
                    method,
                    format!("{}?{}", constants::entity_set_endpoint(base, entity_set), select),
                )
                .header(headers::PREFER, headers::PREFER_RETURN_REPRESENTATION)
                .payload(Some(data.clone()))
                .success(SuccessPredicate::CREATED)
                .parse_body(true)
            }

            Self::Update { entity, data } => RequestDescriptor::new(
                method,
                constants::entity_record_endpoint(base, &entity.entity_set, &entity.path_id()),
            )
            .payload(Some(data.clone()))
            .success(SuccessPredicate::NO_CONTENT),

            Self::Delete { entity } => RequestDescriptor::new(
                method,
                constants::entity_record_endpoint(base, &entity.entity_set, &entity.path_id()),
            )
            .success(SuccessPredicate::NO_CONTENT_OR_LEGACY),

            Self::Associate {
                parent,
                relationship,
                child,
            } => RequestDescriptor::new(
                method,
                constants::navigation_ref_endpoint(base, &parent.entity_set, &parent.path_id(), relationship),
            )
            .payload(Some(json!({ "@odata.id": child.url(endpoint) })))
            .success(SuccessPredicate::NO_CONTENT_OR_LEGACY),

            Self::Disassociate {
                parent,
                relationship,
                child_id,
            } => RequestDescriptor::new(
                method,
                constants::collection_member_ref_endpoint(
                    base,
                    &parent.entity_set,
                    &parent.path_id(),
                    relationship,
                    &strip_braces(child_id),
                ),
            )
            .success(SuccessPredicate::NO_CONTENT_OR_LEGACY),

            Self::DisassociateLookup {
                parent,
                relationship,
            } => RequestDescriptor::new(
                method,
                constants::navigation_ref_endpoint(base, &parent.entity_set, &parent.path_id(), relationship),
            )
            .success(SuccessPredicate::NO_CONTENT_OR_LEGACY),

            Self::CallUnboundAction { action, payload } => {
                RequestDescriptor::new(method, constants::entity_set_endpoint(base, action))
                    .payload(payload.clone())
                    .success(SuccessPredicate::OK_OR_NO_CONTENT)
                    .parse_body(true)
            }

            Self::CallBoundAction {
                entity,
                action,
                payload,
            } => RequestDescriptor::new(
                method,
                constants::bound_action_endpoint(base, &entity.entity_set, &entity.path_id(), action),
            )
            .payload(payload.clone())
            .success(SuccessPredicate::OK_OR_NO_CONTENT)
            .parse_body(true),
        }
    }

    /// Interpret a successful exchange as this operation's result
    pub fn outcome(&self, exchange: Exchange) -> WebApiResult<Outcome> {
        match self {
            Self::Retrieve { .. } | Self::CreateAndSelect { .. } => exchange
                .body
                .map(Outcome::Entity)
                .ok_or_else(|| WebApiError::UnexpectedPayload("response has no body".to_string())),

            Self::RetrieveMultiple { .. } => match exchange.body {
                Some(Value::Object(mut envelope)) => match envelope.remove("value") {
                    Some(Value::Array(records)) => Ok(Outcome::Entities(records)),
                    _ => Err(WebApiError::UnexpectedPayload(
                        "expected 'value' array in response".to_string(),
                    )),
                },
                _ => Err(WebApiError::UnexpectedPayload(
                    "expected an OData collection envelope".to_string(),
                )),
            },

            Self::Create { .. } => exchange
                .response
                .header(headers::ODATA_ENTITY_ID)
                .and_then(entity_id_from_url)
                .map(Outcome::EntityId)
                .ok_or(WebApiError::MissingEntityId),

            Self::CallUnboundAction { .. } | Self::CallBoundAction { .. } => {
                Ok(Outcome::Action(exchange.body))
            }

            Self::Update { .. }
            | Self::Delete { .. }
            | Self::Associate { .. }
            | Self::Disassociate { .. }
            | Self::DisassociateLookup { .. } => Ok(Outcome::NoContent),
        }
    }
}

/// Extract the record id from an `OData-EntityId` URL
pub fn entity_id_from_url(url: &str) -> Option<String> {
    ENTITY_ID_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}
