//! Operation name resolution against the set a deployment actually exposes.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::{PaleoError, Purpose};

/// Listing operation names observed across Paleo deployments, in probe
/// order.
pub const LIST_CANDIDATES: &[&str] = &[
    "CercaDocumentiFascicolo",
    "CercaDocumentiFascicolo2",
    "GetDocumentiFascicolo",
    "GetDocumentiFascicolo2",
    "GetFascicoloDocumenti",
    "ListaDocumentiFascicolo",
];

/// Download operation names observed across Paleo deployments, in probe
/// order.
pub const DOWNLOAD_CANDIDATES: &[&str] = &[
    "ScaricaDocumento",
    "ScaricaDocumento2",
    "DownloadDocumento",
    "GetDocumento",
    "GetFileDocumento",
    "DownloadFileDocumento",
];

/// Pick the operation to call for `purpose`.
///
/// An explicitly configured name always wins but must exist on the service;
/// otherwise the first candidate the service exposes is chosen. Both
/// failure modes report the full operation list so the operator can set the
/// override without a second round trip.
pub fn resolve_operation(
    configured: Option<&str>,
    candidates: &[&str],
    available: &BTreeSet<String>,
    purpose: Purpose,
) -> Result<String, PaleoError> {
    // Empty overrides behave as unset.
    if let Some(name) = configured.filter(|name| !name.is_empty()) {
        if !available.contains(name) {
            return Err(PaleoError::OperationNotFound {
                name: name.to_string(),
                purpose,
                available: available.iter().cloned().collect(),
            });
        }
        debug!(operation = name, purpose = %purpose, "using configured operation");
        return Ok(name.to_string());
    }

    for candidate in candidates {
        if available.contains(*candidate) {
            info!(operation = candidate, purpose = %purpose, "resolved operation by name probing");
            return Ok((*candidate).to_string());
        }
    }

    Err(PaleoError::OperationUndetermined {
        purpose,
        available: available.iter().cloned().collect(),
    })
}
