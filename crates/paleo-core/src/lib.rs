//! paleo-core: Operation-parameter resolution engine for Paleo fascicolo
//! retrieval
//!
//! This crate contains the pure resolution logic with NO transport
//! dependencies:
//! - Logical field enum and the alias table mapping deployment spellings
//! - Element matcher and nested payload resolver
//! - Payload construction cascade and the `RemoteCall` dispatch seam
//! - Response extractors for document listings and binary content
//! - Operation name resolver with per-deployment candidate tables
//!
//! The SOAP layer (WSDL parsing, envelope codec, HTTP transport) lives in
//! the root crate as it requires network access.

pub mod error;
pub mod extract;
pub mod fields;
pub mod invoke;
pub mod payload;
pub mod resolve;
pub mod schema;
pub mod value;

// Re-export the working vocabulary of the engine
pub use error::{ErrorClass, PaleoError, Purpose};
pub use extract::{extract_content, extract_documents, DocumentReference};
pub use fields::{LogicalField, LogicalValues};
pub use invoke::{build_and_invoke, build_payload, RemoteCall};
pub use payload::{match_elements, resolve_nested, MatchOutcome, Payload};
pub use resolve::{resolve_operation, DOWNLOAD_CANDIDATES, LIST_CANDIDATES};
pub use schema::{ElementKind, OperationSchema, ParameterElement};
pub use value::{Value, ValueMap};
