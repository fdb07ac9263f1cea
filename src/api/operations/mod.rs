//! Dynamics CRM Operations Module
//!
//! Each Web API call is an [`Operation`] value: it knows its request shape
//! and how to read its result, and can be run as a future or dispatched
//! with callbacks.

pub mod dispatch;
pub mod operation;
pub mod outcome;

pub use dispatch::{Callbacks, Dispatched};
pub use operation::{Operation, entity_id_from_url};
pub use outcome::Outcome;
