//! Cross-reference resolution
//!
//! Each marker payload is turned into a display term in one of three ways:
//!
//! - **Local**: the payload is a dictionary identifier and resolves to that
//!   entry's title. A miss is a `LookupError` and fails the whole term.
//! - **External**: the payload is substituted into a URL template, the document
//!   behind it is fetched, and the first double-quoted string in it is the term.
//!   Failures come back as [`Resolution::Unresolved`] rather than errors.
//! - **Auto**: local first, external on a miss.
//!
//! [`ReferenceResolver::resolve_all`] always returns exactly one value per
//! payload, in payload order.

use crate::dictionary::TermDictionary;
use crate::errors::NomenError;
use crate::fetcher::DocumentClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    #[default]
    Local,
    External,
    Auto,
}

impl ResolutionMode {
    pub fn needs_external(&self) -> bool {
        matches!(self, ResolutionMode::External | ResolutionMode::Auto)
    }
}

impl FromStr for ResolutionMode {
    type Err = NomenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ResolutionMode::Local),
            "external" => Ok(ResolutionMode::External),
            "auto" => Ok(ResolutionMode::Auto),
            other => Err(NomenError::ConfigError(format!(
                "Unknown resolution mode '{}', expected local, external or auto",
                other
            ))),
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionMode::Local => "local",
            ResolutionMode::External => "external",
            ResolutionMode::Auto => "auto",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved { payload: String, reason: String },
}

impl Resolution {
    pub fn term(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(term) => Some(term),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

// Secondary lookup for identifiers the dictionary cannot answer
#[async_trait]
pub trait ExternalLookup: Send + Sync {
    async fn lookup(&self, payload: &str) -> Result<String, NomenError>;
}

/// Substitute a percent-encoded identifier for every `{id}` in `template`.
pub fn build_lookup_url(template: &str, identifier: &str) -> String {
    template.replace("{id}", &urlencoding::encode(identifier))
}

/// First non-empty `"..."` span in `content`, searched after `anchor` when given.
///
/// Escapes are not interpreted: a `\"` inside the span ends it.
pub fn extract_quoted(content: &str, anchor: Option<&str>) -> Option<String> {
    let mut rest = match anchor {
        Some(anchor) => {
            let at = content.find(anchor)?;
            &content[at + anchor.len()..]
        }
        None => content,
    };

    while let Some(open) = rest.find('"') {
        let after = &rest[open + 1..];
        let close = after.find('"')?;
        let quoted = after[..close].trim();
        if !quoted.is_empty() {
            return Some(quoted.to_string());
        }
        rest = &after[close + 1..];
    }
    None
}

pub struct HttpExternalLookup {
    client: DocumentClient,
    url_template: String,
    anchor: Option<String>,
}

impl HttpExternalLookup {
    pub fn new(
        client: DocumentClient,
        url_template: impl Into<String>,
        anchor: Option<String>,
    ) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            anchor,
        }
    }
}

#[async_trait]
impl ExternalLookup for HttpExternalLookup {
    async fn lookup(&self, payload: &str) -> Result<String, NomenError> {
        let url = build_lookup_url(&self.url_template, payload);
        log::debug!("Resolving '{}' via {}", payload, url);

        let document = self.client.get_text(&url).await?;
        extract_quoted(&document, self.anchor.as_deref())
            .ok_or_else(|| NomenError::fetch(&url, "no quoted term found in document"))
    }
}

#[derive(Clone)]
pub struct ReferenceResolver {
    dictionary: Arc<TermDictionary>,
    mode: ResolutionMode,
    external: Option<Arc<dyn ExternalLookup>>,
}

impl ReferenceResolver {
    pub fn local(dictionary: Arc<TermDictionary>) -> Self {
        Self {
            dictionary,
            mode: ResolutionMode::Local,
            external: None,
        }
    }

    pub fn new(
        dictionary: Arc<TermDictionary>,
        mode: ResolutionMode,
        external: Option<Arc<dyn ExternalLookup>>,
    ) -> Result<Self, NomenError> {
        if mode.needs_external() && external.is_none() {
            return Err(NomenError::ConfigError(format!(
                "Resolution mode '{}' requires an external lookup",
                mode
            )));
        }
        Ok(Self {
            dictionary,
            mode,
            external,
        })
    }

    pub async fn resolve(&self, payload: &str) -> Result<Resolution, NomenError> {
        match self.mode {
            ResolutionMode::Local => self.resolve_local(payload).map(Resolution::Resolved),
            ResolutionMode::External => Ok(self.resolve_external(payload).await),
            ResolutionMode::Auto => match self.resolve_local(payload) {
                Ok(title) => Ok(Resolution::Resolved(title)),
                Err(_) => {
                    log::debug!("'{}' not in dictionary, trying external lookup", payload);
                    Ok(self.resolve_external(payload).await)
                }
            },
        }
    }

    /// Resolve every payload in order. Stops at the first local miss.
    pub async fn resolve_all(&self, payloads: &[String]) -> Result<Vec<Resolution>, NomenError> {
        let mut resolutions = Vec::with_capacity(payloads.len());
        for payload in payloads {
            resolutions.push(self.resolve(payload).await?);
        }
        Ok(resolutions)
    }

    fn resolve_local(&self, payload: &str) -> Result<String, NomenError> {
        self.dictionary
            .title_of(payload)
            .map(str::to_string)
            .ok_or_else(|| NomenError::LookupError {
                identifier: payload.to_string(),
            })
    }

    async fn resolve_external(&self, payload: &str) -> Resolution {
        let Some(external) = &self.external else {
            return Resolution::Unresolved {
                payload: payload.to_string(),
                reason: "no external lookup configured".to_string(),
            };
        };

        match external.lookup(payload).await {
            Ok(term) => Resolution::Resolved(term),
            Err(e) => {
                log::warn!("Could not resolve reference '{}': {}", payload, e);
                Resolution::Unresolved {
                    payload: payload.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
