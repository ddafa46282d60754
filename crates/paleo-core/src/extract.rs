//! Readers for the two response shapes the engine cares about: document
//! listings and binary document content.
//!
//! Deployments disagree on member names and on whether collections arrive
//! wrapped, so both readers probe naming variants in a fixed priority order
//! instead of assuming one schema.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::PaleoError;
use crate::value::Value;

/// One document belonging to the fascicolo, as reported by the listing
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    pub document_id: String,
    pub filename: String,
    pub mime_type: Option<String>,
}

const ID_KEYS: &[&str] = &["Id", "DocumentId", "documentoId"];
const FILENAME_KEYS: &[&str] = &["NomeFile", "FileName", "nomeFile"];
const MIME_KEYS: &[&str] = &["MimeType", "mimeType"];
const CONTENT_KEYS: &[&str] = &["File", "Contenuto"];

/// First non-empty text among several member spellings. Empty strings are
/// treated the same as absent members so that a later spelling can still
/// supply the value.
fn first_text<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .filter_map(Value::as_text)
        .find(|text| !text.is_empty())
}

/// Pull document references out of a listing response.
///
/// Collections may arrive under a `Documenti` member or as the response
/// itself, and a single document may arrive bare rather than as a
/// one-element list. Entries without a usable identifier are dropped; an
/// empty or missing response yields an empty list rather than an error.
pub fn extract_documents(response: Option<&Value>) -> Vec<DocumentReference> {
    let Some(response) = response else {
        return Vec::new();
    };
    let documents = response.get("Documenti").unwrap_or(response);
    let items = match documents.as_list() {
        Some(items) => items,
        None => std::slice::from_ref(documents),
    };

    let mut output = Vec::new();
    for item in items {
        let Some(id) = first_text(item, ID_KEYS) else {
            warn!("skipping listing entry without a document identifier");
            continue;
        };
        let filename = first_text(item, FILENAME_KEYS)
            .map(str::to_string)
            .unwrap_or_else(|| format!("documento_{id}.bin"));
        let mime_type = first_text(item, MIME_KEYS).map(str::to_string);
        output.push(DocumentReference {
            document_id: id.to_string(),
            filename,
            mime_type,
        });
    }
    debug!(count = output.len(), "extracted document references");
    output
}

/// Pull the binary content out of a download response.
///
/// The content is either the response itself or its `File`/`Contenuto`
/// member, carried as raw bytes or as base64 text. Only the first member
/// present is considered; a `File` member of the wrong shape is an error
/// even when `Contenuto` also exists.
pub fn extract_content(response: Option<&Value>) -> Result<Vec<u8>, PaleoError> {
    let Some(response) = response else {
        return Err(PaleoError::EmptyDownloadResponse);
    };
    if let Some(content) = decode_leaf(response)? {
        return Ok(content);
    }
    if let Some(member) = response.first_of(CONTENT_KEYS) {
        if let Some(content) = decode_leaf(member)? {
            return Ok(content);
        }
    }
    Err(PaleoError::UnrecognizedContent)
}

fn decode_leaf(value: &Value) -> Result<Option<Vec<u8>>, PaleoError> {
    match value {
        Value::Bytes(bytes) => Ok(Some(bytes.clone())),
        Value::Text(text) => Ok(Some(decode_base64(text)?)),
        _ => Ok(None),
    }
}

/// Base64 with incidental whitespace tolerated; services line-wrap large
/// payloads.
fn decode_base64(text: &str) -> Result<Vec<u8>, PaleoError> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    Ok(BASE64.decode(compact)?)
}
