//! Logical parameter fields and their remote spellings.
//!
//! A logical field is an abstract parameter name (case-file id, organization
//! code, credentials) independent of any deployment's spelling of it. The
//! alias table records every spelling observed across Paleo deployments, in
//! probe order. Supporting a new deployment means appending a spelling here,
//! never touching matching logic.

use std::collections::BTreeMap;

/// The closed set of logical parameter names the client ever sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalField {
    CodiceAoo,
    FascicoloId,
    DocumentoId,
    Username,
    Password,
}

impl LogicalField {
    pub const ALL: [LogicalField; 5] = [
        LogicalField::CodiceAoo,
        LogicalField::FascicoloId,
        LogicalField::DocumentoId,
        LogicalField::Username,
        LogicalField::Password,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalField::CodiceAoo => "codice_aoo",
            LogicalField::FascicoloId => "fascicolo_id",
            LogicalField::DocumentoId => "documento_id",
            LogicalField::Username => "username",
            LogicalField::Password => "password",
        }
    }

    /// Remote element-name spellings for this field, most common first.
    /// The matcher probes these in order and takes the first hit.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalField::CodiceAoo => &[
                "codiceAOO",
                "CodiceAOO",
                "aoo",
                "AOO",
                "codiceOrganizzazione",
                "CodiceOrganizzazione",
            ],
            LogicalField::FascicoloId => &[
                "fascicoloId",
                "FascicoloId",
                "idFascicolo",
                "IdFascicolo",
                "identificativoFascicolo",
                "IdentificativoFascicolo",
            ],
            LogicalField::DocumentoId => &[
                "documentoId",
                "DocumentoId",
                "idDocumento",
                "IdDocumento",
                "idDocumentoPrimario",
                "IdDocumentoPrimario",
            ],
            LogicalField::Username => &["username", "userName", "utente", "UserName", "Utente"],
            LogicalField::Password => &["password", "pwd", "Password", "Pwd"],
        }
    }
}

impl std::fmt::Display for LogicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logical values assembled for one operation invocation.
///
/// Iteration order is the `LogicalField` declaration order regardless of
/// insertion order, so payload construction from equal inputs is
/// byte-identical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicalValues {
    values: BTreeMap<LogicalField, String>,
}

impl LogicalValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: LogicalField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: LogicalField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
