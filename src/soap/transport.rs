//! Blocking HTTP layer under the SOAP codec.
//!
//! Credentials ride as HTTP basic auth on every request, the WSDL fetch
//! included; the Paleo reverse proxy authenticates before the service does.

use std::time::Duration;

use anyhow::{anyhow, Context};
use paleo_core::PaleoError;
use tracing::debug;

pub struct SoapTransport {
    http: reqwest::blocking::Client,
    username: String,
    password: String,
}

impl SoapTransport {
    pub fn new(timeout: Duration, username: &str, password: &str) -> Result<Self, PaleoError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("building the HTTP client")
            .map_err(PaleoError::Transport)?;
        Ok(Self {
            http,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Fetch a text document, the service description in practice.
    pub fn get_text(&self, url: &str) -> Result<String, PaleoError> {
        debug!(%url, "fetching service description");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .with_context(|| format!("requesting {url}"))
            .map_err(PaleoError::Transport)?;
        let status = response.status();
        let text = response
            .text()
            .context("reading response body")
            .map_err(PaleoError::Transport)?;
        if !status.is_success() {
            return Err(PaleoError::Transport(anyhow!(
                "HTTP {status} fetching {url}: {}",
                snippet(&text)
            )));
        }
        Ok(text)
    }

    /// Post one SOAP 1.1 call. The body comes back together with the status
    /// so the caller can mine fault details out of HTTP 500 responses.
    pub fn post_soap(
        &self,
        endpoint: &str,
        soap_action: &str,
        envelope: String,
    ) -> Result<(reqwest::StatusCode, String), PaleoError> {
        debug!(%endpoint, soap_action, bytes = envelope.len(), "posting SOAP request");
        let response = self
            .http
            .post(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{soap_action}\""))
            .body(envelope)
            .send()
            .with_context(|| format!("posting to {endpoint}"))
            .map_err(PaleoError::Transport)?;
        let status = response.status();
        let text = response
            .text()
            .context("reading response body")
            .map_err(PaleoError::Transport)?;
        Ok((status, text))
    }
}

/// First 200 characters of a body, for error messages.
pub(crate) fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_on_character_boundaries() {
        assert_eq!(snippet("  breve  "), "breve");
        let long = "è".repeat(300);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
