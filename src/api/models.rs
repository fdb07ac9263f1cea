use super::constants;
use serde::{Deserialize, Serialize};

/// Base URL of the Web API service, ending in `/api/data/{version}/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    url: String,
}

impl ServiceEndpoint {
    /// Build the endpoint from an organization client URL
    pub fn from_client_url(client_url: &str, api_version: &str) -> Self {
        Self {
            url: format!(
                "{}{}",
                client_url.trim_end_matches('/'),
                constants::api_path(api_version)
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// A record addressed by entity set and id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    /// Entity set name (e.g., "accounts", "contacts")
    pub entity_set: String,
    /// Record ID (GUID), braces allowed
    pub id: String,
}

impl EntityReference {
    pub fn new(entity_set: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_set: entity_set.into(),
            id: id.into(),
        }
    }

    /// Record id as it appears in a URL path segment
    pub fn path_id(&self) -> String {
        strip_braces(&self.id)
    }

    /// Absolute record URL, as used for `@odata.id` bindings
    pub fn url(&self, endpoint: &ServiceEndpoint) -> String {
        constants::entity_record_endpoint(endpoint.as_str(), &self.entity_set, &self.path_id())
    }
}

/// Remove the first `{` and the first `}` from an id.
///
/// Only one of each is removed: `{a}{b}` becomes `a{b}`.
pub fn strip_braces(id: &str) -> String {
    id.replacen('{', "", 1).replacen('}', "", 1)
}
