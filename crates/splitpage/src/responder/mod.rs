//! Responder server module.
//!
//! This module provides the inbound side of splitpage:
//! - Method dispatch (GET only)
//! - The variant pipeline (manifest, selection, page fetch, rewrite)
//! - Sticky variant cookies
//! - Mapping pipeline failures to HTTP responses
//!
//! # Module Structure
//!
//! - `server` - ResponderServer struct and main run loop
//! - `handler` - Method dispatch and pipeline orchestration
//! - `response` - Page and error response construction
//! - `headers` - Static header names and insertion helpers
//! - `metrics_server` - Prometheus exposition on a separate port

mod handler;
mod headers;
mod metrics_server;
mod response;
mod server;


pub use handler::{dispatch, handle_request, Dispatch, RequestHandlerContext};
pub use response::{error_response, ResponseExt, UNSUPPORTED_METHOD_BODY};
pub use server::ResponderServer;
