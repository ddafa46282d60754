//! High-level client for one fascicolo on one deployment.
//!
//! Connecting resolves everything upfront: fetch and parse the WSDL, pick
//! the endpoint, settle both operation names, snapshot their parameter
//! shapes. After that every call is deterministic; nothing about the
//! service is re-negotiated between calls.

use paleo_core::{
    build_and_invoke, extract_content, extract_documents, resolve_operation, DocumentReference,
    LogicalField, LogicalValues, OperationSchema, PaleoError, Purpose, RemoteCall,
    DOWNLOAD_CANDIDATES, LIST_CANDIDATES,
};
use tracing::info;

use crate::config::PaleoConfig;
use crate::soap::transport::SoapTransport;
use crate::soap::SoapGateway;
use crate::wsdl::ServiceDescription;

const LIST_REQUIRED: &[LogicalField] = &[LogicalField::CodiceAoo, LogicalField::FascicoloId];
const DOWNLOAD_REQUIRED: &[LogicalField] = &[LogicalField::CodiceAoo, LogicalField::DocumentoId];

/// An operation settled at connect time: its resolved name and the
/// parameter shape snapshotted from the service description.
#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub name: String,
    pub schema: OperationSchema,
}

pub struct PaleoClient<G: RemoteCall> {
    gateway: G,
    org_code: String,
    fascicolo_id: String,
    username: String,
    password: String,
    list_operation: ResolvedOperation,
    download_operation: ResolvedOperation,
}

impl PaleoClient<SoapGateway> {
    /// Connect to the deployment named by `config`.
    pub fn connect(config: &PaleoConfig) -> Result<Self, PaleoError> {
        let transport = SoapTransport::new(config.timeout, &config.username, &config.password)?;
        let wsdl_text = transport.get_text(&config.wsdl_url)?;
        let description = ServiceDescription::parse(&wsdl_text)?;
        let endpoint = description.resolve_endpoint(config.binding())?.to_string();

        let available = description.operation_names();
        let list_name = resolve_operation(
            config.list_method.as_deref(),
            LIST_CANDIDATES,
            &available,
            Purpose::ListDocuments,
        )?;
        let download_name = resolve_operation(
            config.download_method.as_deref(),
            DOWNLOAD_CANDIDATES,
            &available,
            Purpose::DownloadDocument,
        )?;
        info!(
            endpoint = %endpoint,
            list = %list_name,
            download = %download_name,
            "connected to the Paleo service"
        );

        let list_operation = snapshot(&description, &list_name);
        let download_operation = snapshot(&description, &download_name);
        let gateway = SoapGateway::new(transport, endpoint, description);
        Ok(Self::from_parts(
            gateway,
            config,
            list_operation,
            download_operation,
        ))
    }
}

impl<G: RemoteCall> PaleoClient<G> {
    /// Assemble a client over an already-resolved gateway.
    pub fn from_parts(
        gateway: G,
        config: &PaleoConfig,
        list_operation: ResolvedOperation,
        download_operation: ResolvedOperation,
    ) -> Self {
        Self {
            gateway,
            org_code: config.org_code.clone(),
            fascicolo_id: config.fascicolo_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            list_operation,
            download_operation,
        }
    }

    pub fn list_operation_name(&self) -> &str {
        &self.list_operation.name
    }

    pub fn download_operation_name(&self) -> &str {
        &self.download_operation.name
    }

    /// Documents belonging to the configured fascicolo.
    pub fn list_documents(&self) -> Result<Vec<DocumentReference>, PaleoError> {
        let values = self
            .base_values()
            .with(LogicalField::FascicoloId, self.fascicolo_id.as_str());
        let response = build_and_invoke(
            &self.gateway,
            &self.list_operation.name,
            &self.list_operation.schema,
            &values,
            LIST_REQUIRED,
            Purpose::ListDocuments,
        )?;
        Ok(extract_documents(response.as_ref()))
    }

    /// Binary content of one listed document.
    pub fn download_document(&self, document: &DocumentReference) -> Result<Vec<u8>, PaleoError> {
        let values = self
            .base_values()
            .with(LogicalField::DocumentoId, document.document_id.as_str());
        let response = build_and_invoke(
            &self.gateway,
            &self.download_operation.name,
            &self.download_operation.schema,
            &values,
            DOWNLOAD_REQUIRED,
            Purpose::DownloadDocument,
        )?;
        extract_content(response.as_ref())
    }

    fn base_values(&self) -> LogicalValues {
        LogicalValues::new()
            .with(LogicalField::CodiceAoo, self.org_code.as_str())
            .with(LogicalField::Username, self.username.as_str())
            .with(LogicalField::Password, self.password.as_str())
    }
}

fn snapshot(description: &ServiceDescription, operation: &str) -> ResolvedOperation {
    ResolvedOperation {
        name: operation.to_string(),
        schema: description
            .operation(operation)
            .map(|op| op.schema.clone())
            .unwrap_or_default(),
    }
}
