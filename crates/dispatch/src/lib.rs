//! Build dispatcher.
//!
//! Triggers exactly one external build job per [`BuildRequest`]. The job's
//! display name is the request's [run name](BuildRequest::run_name): a fixed
//! textual format that downstream publishing and reconciliation parse to
//! recover which combination a run built.

pub mod dispatcher;
pub mod error;
mod request;

pub use crate::dispatcher::Dispatcher;
pub use crate::request::BuildRequest;
use std::sync::Arc;

pub type DispatcherHandle = Arc<dyn Dispatcher + Send + Sync>;
