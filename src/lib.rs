//! paleo-download: retrieve the documents of a Paleo fascicolo over SOAP.
//!
//! The work splits in two. The `paleo-core` crate carries the resolution
//! engine (field aliases, payload construction, response extraction) with
//! no transport dependencies; this crate carries the SOAP side (WSDL
//! reading, envelope codec, blocking HTTP) plus the high-level client the
//! CLI drives.

pub mod client;
pub mod config;
pub mod soap;
pub mod wsdl;

pub use client::{PaleoClient, ResolvedOperation};
pub use config::{PaleoConfig, DEFAULT_ENV_FILE, DEFAULT_WSDL_URL};
pub use soap::SoapGateway;
pub use wsdl::{ServiceDescription, WsdlOperation};

// Re-export the engine vocabulary so callers have one import path.
pub use paleo_core::{
    DocumentReference, ErrorClass, LogicalField, LogicalValues, OperationSchema, PaleoError,
    ParameterElement, Payload, Purpose, RemoteCall, Value, ValueMap,
};
