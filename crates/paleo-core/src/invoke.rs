//! Payload construction and dispatch for one remote operation.
//!
//! The cascade is: degenerate schema passthrough, then flat matching, then
//! nested-wrapper probing, then a configuration error naming what could not
//! be placed. A resolution failure is an operator problem (the alias table
//! does not know the deployment), so there are no retries here.

use tracing::debug;

use crate::error::{PaleoError, Purpose};
use crate::fields::{LogicalField, LogicalValues};
use crate::payload::{match_elements, resolve_nested, Payload};
use crate::schema::OperationSchema;
use crate::value::Value;

/// The remote call capability: dispatch a keyword-style payload to a named
/// operation and hand back the untyped response tree, `None` when the
/// service answered with no body.
pub trait RemoteCall {
    fn invoke(&self, operation: &str, payload: &Payload) -> Result<Option<Value>, PaleoError>;
}

/// Shape `values` into a payload the operation accepts.
///
/// An operation declaring no parameter elements at all passes the logical
/// values through under their logical key names; the degenerate schemas
/// observed in the wild already expect those spellings.
pub fn build_payload(
    schema: &OperationSchema,
    values: &LogicalValues,
    required: &[LogicalField],
    purpose: Purpose,
) -> Result<Payload, PaleoError> {
    if schema.is_empty() {
        let mut payload = Payload::new();
        for (field, value) in values.iter() {
            payload.insert(field.as_str().to_string(), Value::Text(value.to_string()));
        }
        return Ok(payload);
    }

    let flat = match_elements(&schema.elements, values);
    if flat.covers(required) {
        debug!(purpose = %purpose, matched = flat.matched.len(), "flat parameter match");
        return Ok(flat.payload);
    }

    if let Some(nested) = resolve_nested(&schema.elements, values) {
        if nested.covers(required) {
            debug!(purpose = %purpose, matched = nested.matched.len(), "nested parameter match");
            return Ok(nested.payload);
        }
        debug!(
            purpose = %purpose,
            matched = nested.matched.len(),
            "best nested candidate does not cover the required fields"
        );
    }

    let missing: Vec<LogicalField> = required
        .iter()
        .filter(|field| !flat.matched.contains(field))
        .copied()
        .collect();
    Err(PaleoError::UnmatchedParameters {
        purpose,
        missing,
        declared: schema.element_names().map(str::to_string).collect(),
    })
}

/// Build the payload for `operation` and dispatch it, returning the raw
/// response unmodified.
pub fn build_and_invoke<G: RemoteCall + ?Sized>(
    gateway: &G,
    operation: &str,
    schema: &OperationSchema,
    values: &LogicalValues,
    required: &[LogicalField],
    purpose: Purpose,
) -> Result<Option<Value>, PaleoError> {
    let payload = build_payload(schema, values, required, purpose)?;
    debug!(%operation, entries = payload.len(), "invoking remote operation");
    gateway.invoke(operation, &payload)
}
