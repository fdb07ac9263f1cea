//! Dynamics CRM Web API Module
//!
//! A thin client over the OData v4 Web API: each operation is one HTTP
//! request with the standard OData headers, a fixed URL shape and a fixed
//! set of accepted status codes.

pub mod client;
pub mod constants;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod operations;
pub mod request;
pub mod transport;

pub use client::{WebApiClient, WebApiClientBuilder};
pub use context::{ClientUrlAccessor, ContextResolver, EnvContext, HostContext, StaticContext};
pub use error::{ODataError, WebApiError, WebApiResult, decode_error_message};
pub use executor::{Exchange, Executor, FailureHook};
pub use logging::{ApiLogger, LogLevel, LoggingConfig};
pub use models::{EntityReference, ServiceEndpoint, strip_braces};
pub use operations::{Callbacks, Dispatched, Operation, Outcome};
pub use request::{ExecutionMode, HttpRequest, HttpResponse, RequestDescriptor, SuccessPredicate};
pub use transport::{ReqwestTransport, Transport};
