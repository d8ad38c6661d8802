//! Blog backend library: domain, HTTP adapter, persistence and OpenAPI docs.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
pub use middleware::trace::TRACE_ID_HEADER;
