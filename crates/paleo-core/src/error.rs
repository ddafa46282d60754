use thiserror::Error;

use crate::fields::LogicalField;

/// What a remote call is for, from the operator's point of view.
///
/// Carried by every resolution error so a failure names the step that broke,
/// and used to pick the right override variable in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    ListDocuments,
    DownloadDocument,
}

impl Purpose {
    /// Environment variable that pins the operation name for this purpose.
    pub fn override_var(self) -> &'static str {
        match self {
            Purpose::ListDocuments => "PALEO_LIST_METHOD",
            Purpose::DownloadDocument => "PALEO_DOWNLOAD_METHOD",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Purpose::ListDocuments => write!(f, "document listing"),
            Purpose::DownloadDocument => write!(f, "document download"),
        }
    }
}

/// Failure class per the error-handling design: configuration problems are
/// fixed by the operator (alias table, env overrides), shape mismatches by a
/// code change, transport failures are opaque and propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Configuration,
    ResponseShape,
    Transport,
}

#[derive(Debug, Error)]
pub enum PaleoError {
    #[error("missing required environment variable {0}")]
    MissingConfig(&'static str),

    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("invalid service description: {0}")]
    ServiceDescription(String),

    #[error("the WSDL does not declare a default service; set PALEO_SERVICE_NAME and PALEO_PORT_NAME")]
    NoDefaultService,

    #[error("operation '{name}' not found for {purpose}; available operations: {}", available.join(", "))]
    OperationNotFound {
        name: String,
        purpose: Purpose,
        available: Vec<String>,
    },

    #[error("unable to determine the operation for {purpose}; set {} explicitly; available operations: {}", purpose.override_var(), available.join(", "))]
    OperationUndetermined {
        purpose: Purpose,
        available: Vec<String>,
    },

    #[error("unrecognized parameters for {purpose}: {}; elements declared by the service: {}", join_fields(missing), declared.join(", "))]
    UnmatchedParameters {
        purpose: Purpose,
        missing: Vec<LogicalField>,
        declared: Vec<String>,
    },

    #[error("empty response from the document download operation")]
    EmptyDownloadResponse,

    #[error("unrecognized response shape for document content")]
    UnrecognizedContent,

    #[error("document content is not valid base64: {0}")]
    ContentDecode(#[from] base64::DecodeError),

    #[error("SOAP fault from service: {code}: {message}")]
    Fault { code: String, message: String },

    #[error("transport: {0}")]
    Transport(#[from] anyhow::Error),
}

impl PaleoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingConfig(_)
            | Self::InvalidConfig { .. }
            | Self::ServiceDescription(_)
            | Self::NoDefaultService
            | Self::OperationNotFound { .. }
            | Self::OperationUndetermined { .. }
            | Self::UnmatchedParameters { .. } => ErrorClass::Configuration,
            Self::EmptyDownloadResponse | Self::UnrecognizedContent | Self::ContentDecode(_) => {
                ErrorClass::ResponseShape
            }
            Self::Fault { .. } | Self::Transport(_) => ErrorClass::Transport,
        }
    }
}

fn join_fields(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
