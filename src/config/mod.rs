//! Sealights configuration, extracted from the service bindings of the application.
pub mod extractor;
pub mod options;

pub use extractor::ConfigExtractor;
pub use options::{AgentArgs, SealightsOptions};
