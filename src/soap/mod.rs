//! SOAP plumbing: XML tree, envelope codec, HTTP transport, and the gateway
//! that wires them together behind [`RemoteCall`].

pub mod envelope;
pub mod transport;
pub mod xml;

use anyhow::anyhow;
use paleo_core::{PaleoError, Payload, RemoteCall, Value};
use tracing::debug;

use crate::soap::transport::{snippet, SoapTransport};
use crate::wsdl::ServiceDescription;

/// Live connection to one deployment: resolved endpoint plus the parsed
/// service description that shapes every call.
pub struct SoapGateway {
    transport: SoapTransport,
    endpoint: String,
    description: ServiceDescription,
}

impl SoapGateway {
    pub fn new(transport: SoapTransport, endpoint: String, description: ServiceDescription) -> Self {
        Self {
            transport,
            endpoint,
            description,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }
}

impl RemoteCall for SoapGateway {
    fn invoke(&self, operation: &str, payload: &Payload) -> Result<Option<Value>, PaleoError> {
        let declared = self.description.operation(operation).ok_or_else(|| {
            PaleoError::ServiceDescription(format!(
                "operation '{operation}' is not declared by the service"
            ))
        })?;
        let envelope = envelope::build_request(
            &declared.input_element,
            &self.description.target_namespace,
            &declared.schema,
            payload,
        );
        let (status, body) =
            self.transport
                .post_soap(&self.endpoint, &declared.soap_action, envelope)?;
        if !status.is_success() {
            // Fault details ride on HTTP 500; prefer them to a bare status.
            return match envelope::parse_response(&body) {
                Err(fault @ PaleoError::Fault { .. }) => Err(fault),
                _ => Err(PaleoError::Transport(anyhow!(
                    "HTTP {status} from {}: {}",
                    self.endpoint,
                    snippet(&body)
                ))),
            };
        }
        debug!(%operation, status = %status, "SOAP call completed");
        envelope::parse_response(&body)
    }
}
