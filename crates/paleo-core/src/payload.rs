//! Element matching: shaping logical values onto a declared schema.
//!
//! Deployments of the same service disagree on parameter spellings and on
//! whether parameters are flat top-level elements or nested inside a single
//! wrapper element. The matcher handles spelling variants; the nested
//! resolver detects the wrapper shape structurally, so no per-deployment
//! configuration is needed.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::fields::{LogicalField, LogicalValues};
use crate::schema::ParameterElement;
use crate::value::{Value, ValueMap};

/// A payload ready to dispatch: remote element name to value, either flat or
/// a single wrapper entry holding a nested flat map. Never a mix.
pub type Payload = ValueMap;

/// What a matching pass produced: the candidate payload and which logical
/// fields it managed to place. Partial coverage is a valid outcome; the
/// caller decides whether it suffices.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub payload: Payload,
    pub matched: BTreeSet<LogicalField>,
}

impl MatchOutcome {
    pub fn covers(&self, required: &[LogicalField]) -> bool {
        required.iter().all(|field| self.matched.contains(field))
    }
}

/// Map logical values onto a flat list of declared element names.
///
/// Lookup is case-insensitive but the payload carries the declared casing.
/// Per field, aliases are probed in table order and the first hit wins;
/// remaining aliases are not considered. Fields with no matching declared
/// element are simply left out of the payload.
pub fn match_elements(elements: &[ParameterElement], values: &LogicalValues) -> MatchOutcome {
    let lowered: HashMap<String, &str> = elements
        .iter()
        .map(|element| (element.name.to_lowercase(), element.name.as_str()))
        .collect();

    let mut payload = Payload::new();
    let mut matched = BTreeSet::new();

    for (field, value) in values.iter() {
        for alias in field.aliases() {
            if let Some(declared) = lowered.get(&alias.to_lowercase()) {
                payload.insert((*declared).to_string(), Value::Text(value.to_string()));
                matched.insert(field);
                break;
            }
        }
    }

    MatchOutcome { payload, matched }
}

/// Probe every wrapper element's nested list and keep the candidate that
/// places the most logical fields. Ties keep the first wrapper encountered.
///
/// Returns `None` when no wrapper exposes nested elements, or when no
/// wrapper places a single field; a zero-coverage wrapper is never a
/// candidate. The winning payload nests the inner map under the wrapper's
/// declared name.
pub fn resolve_nested(
    elements: &[ParameterElement],
    values: &LogicalValues,
) -> Option<MatchOutcome> {
    let mut best: Option<(&str, MatchOutcome)> = None;

    for element in elements {
        let Some(nested) = element.nested() else {
            continue;
        };
        let inner = match_elements(nested, values);
        let best_len = best.as_ref().map_or(0, |(_, outcome)| outcome.matched.len());
        if inner.matched.len() > best_len {
            debug!(
                wrapper = %element.name,
                matched = inner.matched.len(),
                "nested wrapper candidate"
            );
            best = Some((&element.name, inner));
        }
    }

    best.map(|(wrapper, inner)| {
        let mut payload = Payload::new();
        payload.insert(wrapper.to_string(), Value::Map(inner.payload));
        MatchOutcome {
            payload,
            matched: inner.matched,
        }
    })
}
