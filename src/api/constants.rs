//! API Constants and Configuration for the Dynamics CRM Web API

/// Web API version used when no other version is configured
pub const API_VERSION: &str = "v8.2";

/// Base API path for Dynamics CRM
pub const API_BASE_PATH: &str = "/api/data";

/// Default page size sent with list retrievals
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 5000;

/// Default query string appended to create-and-select requests
pub const DEFAULT_CREATE_SELECT: &str = "$select=createdon";

/// Navigation link suffix for association requests
pub const REF_SEGMENT: &str = "$ref";

/// Full API path with version, including the trailing slash
pub fn api_path(version: &str) -> String {
    format!("{}/{}/", API_BASE_PATH, version)
}

/// Standard headers for Dynamics CRM requests
pub mod headers {
    pub const ODATA_MAX_VERSION: &str = "OData-MaxVersion";
    pub const ODATA_VERSION: &str = "OData-Version";
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const PREFER: &str = "Prefer";

    /// Response header carrying the URL of a newly created record
    pub const ODATA_ENTITY_ID: &str = "OData-EntityId";

    /// OData protocol version sent as both max and current version
    pub const ODATA_VERSION_VALUE: &str = "4.0";

    /// Accept header value
    pub const ACCEPT_JSON: &str = "application/json";

    /// Content type for JSON request bodies
    pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

    /// Prefer header for returning representation
    pub const PREFER_RETURN_REPRESENTATION: &str = "return=representation";

    /// Prefer header asking for all formatted-value annotations
    pub const PREFER_INCLUDE_ANNOTATIONS: &str = "odata.include-annotations=\"*\"";

    /// Prefer header for list retrievals: annotations plus a page size
    pub fn prefer_max_page_size(max_page_size: u32) -> String {
        format!("{},odata.maxpagesize={}", PREFER_INCLUDE_ANNOTATIONS, max_page_size)
    }
}

/// Status codes the operations treat as success
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;

    /// Old Internet Explorer builds report 204 as 1223
    pub const LEGACY_NO_CONTENT: u16 = 1223;
}

/// Build entity set endpoint URL
pub fn entity_set_endpoint(service_url: &str, entity_set: &str) -> String {
    format!("{}{}", service_url, entity_set)
}

/// Build entity record endpoint URL
pub fn entity_record_endpoint(service_url: &str, entity_set: &str, id: &str) -> String {
    format!("{}{}({})", service_url, entity_set, id)
}

/// Build the `$ref` link for a single collection member
pub fn collection_member_ref_endpoint(
    service_url: &str,
    parent_set: &str,
    parent_id: &str,
    relationship: &str,
    child_id: &str,
) -> String {
    format!(
        "{}{}({})/{}({})/{}",
        service_url, parent_set, parent_id, relationship, child_id, REF_SEGMENT
    )
}

/// Build the `$ref` link for a navigation property
pub fn navigation_ref_endpoint(
    service_url: &str,
    parent_set: &str,
    parent_id: &str,
    relationship: &str,
) -> String {
    format!(
        "{}{}({})/{}/{}",
        service_url, parent_set, parent_id, relationship, REF_SEGMENT
    )
}

/// Build bound action endpoint URL
pub fn bound_action_endpoint(service_url: &str, entity_set: &str, id: &str, action: &str) -> String {
    format!("{}{}({})/{}", service_url, entity_set, id, action)
}
