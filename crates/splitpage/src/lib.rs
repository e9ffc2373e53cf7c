// Library exports for the binary and integration tests

pub mod catalog;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod observer;
pub mod responder;
pub mod rewriter;
pub mod selector;

pub use catalog::VariantCatalog;
pub use config::Config;
pub use error::PipelineError;
pub use responder::ResponderServer;
