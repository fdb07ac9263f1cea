//! Callback-style delivery for dispatched operations

use super::outcome::Outcome;
use crate::api::error::{WebApiError, WebApiResult};
use log::warn;
use tokio::task::{JoinError, JoinHandle};

type SuccessCallback = Box<dyn FnOnce(Outcome) + Send + 'static>;
type ErrorCallback = Box<dyn FnOnce(WebApiError) + Send + 'static>;

/// Success and error handlers for one dispatched operation.
///
/// Delivery consumes the handlers, so at most one of them runs, once.
#[derive(Default)]
pub struct Callbacks {
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(WebApiError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub(crate) fn deliver(self, result: WebApiResult<Outcome>) {
        match result {
            Ok(outcome) => {
                if let Some(callback) = self.on_success {
                    callback(outcome);
                }
            }
            Err(error) => match self.on_error {
                Some(callback) => callback(error),
                None => warn!("Unhandled Web API error: {}", error),
            },
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// State of a dispatched operation when `dispatch` returns
#[derive(Debug)]
pub enum Dispatched {
    /// The exchange finished and its callback already ran
    Completed,
    /// The exchange runs in the background; its callback runs on completion
    Pending(JoinHandle<()>),
}

impl Dispatched {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Wait for a pending exchange (and its callback) to finish
    pub async fn wait(self) -> Result<(), JoinError> {
        match self {
            Self::Completed => Ok(()),
            Self::Pending(handle) => handle.await,
        }
    }
}
