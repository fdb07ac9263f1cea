pub mod api;
pub mod config;

pub use api::{
    Callbacks, EntityReference, ExecutionMode, Operation, Outcome, WebApiClient, WebApiError,
    WebApiResult,
};
pub use config::{ClientSettings, Config};
