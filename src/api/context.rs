//! Host context resolution
//!
//! The organization URL comes from whatever hosts the client: a form page, a
//! web resource, a server process. Resolution runs on every operation so a
//! resolver may answer differently over time.

use super::error::{WebApiError, WebApiResult};
use std::sync::Arc;

/// Yields the organization base URL for the current host session
pub trait ContextResolver: Send + Sync {
    fn client_url(&self) -> WebApiResult<String>;
}

/// Accessor returning a client URL, or `None` when the host cannot supply one
pub type ClientUrlAccessor = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Fixed organization URL
#[derive(Debug, Clone)]
pub struct StaticContext {
    client_url: String,
}

impl StaticContext {
    pub fn new(client_url: impl Into<String>) -> Self {
        Self {
            client_url: client_url.into(),
        }
    }
}

impl ContextResolver for StaticContext {
    fn client_url(&self) -> WebApiResult<String> {
        Ok(self.client_url.clone())
    }
}

/// Lookup chain over host-provided accessors.
///
/// The global accessor wins when it yields a URL. Otherwise the local page
/// context is used, falling back to the parent frame's page context when the
/// local one is absent.
#[derive(Clone, Default)]
pub struct HostContext {
    global_context: Option<ClientUrlAccessor>,
    page_context: Option<ClientUrlAccessor>,
    parent_page_context: Option<ClientUrlAccessor>,
}

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global context accessor (`GetGlobalContext().getClientUrl`)
    pub fn with_global_context<F>(mut self, accessor: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.global_context = Some(Arc::new(accessor));
        self
    }

    /// Page context accessor (`Xrm.Page.context.getClientUrl`)
    pub fn with_page_context<F>(mut self, accessor: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.page_context = Some(Arc::new(accessor));
        self
    }

    /// Page context of the parent frame, consulted when the local one is absent
    pub fn with_parent_page_context<F>(mut self, accessor: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.parent_page_context = Some(Arc::new(accessor));
        self
    }
}

impl ContextResolver for HostContext {
    fn client_url(&self) -> WebApiResult<String> {
        if let Some(url) = self.global_context.as_ref().and_then(|accessor| accessor()) {
            return Ok(url);
        }

        let page_context = self.page_context.as_ref().or(self.parent_page_context.as_ref());
        match page_context {
            Some(accessor) => accessor().ok_or_else(|| {
                WebApiError::ContextUnavailable(
                    "page context getClientUrl is not available.".to_string(),
                )
            }),
            None => Err(WebApiError::ContextUnavailable(
                "Context is not available.".to_string(),
            )),
        }
    }
}

/// Organization URL read from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvContext {
    variable: String,
}

impl EnvContext {
    pub const DEFAULT_VARIABLE: &'static str = "DYNAMICS_HOST";

    pub fn new() -> Self {
        Self::with_variable(Self::DEFAULT_VARIABLE)
    }

    /// Read from a custom variable; loads `.env` if one exists
    pub fn with_variable(variable: impl Into<String>) -> Self {
        dotenvy::dotenv().ok();
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextResolver for EnvContext {
    fn client_url(&self) -> WebApiResult<String> {
        match std::env::var(&self.variable) {
            Ok(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(WebApiError::ContextUnavailable(format!(
                "Context is not available: {} is not set.",
                self.variable
            ))),
        }
    }
}
