//! Definition retrieval over HTTP
//!
//! The fetcher turns a dictionary entry's reference URL into plain definition
//! text. The HTML handling is deliberately shallow: the first capture of a
//! configurable pattern is taken as the definition body and tags are stripped.
//! Entities stay encoded so that an escaped delimiter such as `&#64;` cannot
//! pose as a cross-reference marker. [`decode_entities`] runs once the markers
//! have been substituted.

use crate::errors::NomenError;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_DEFINITION_PATTERN: &str =
    r#"(?s)<div[^>]*class="[^"]*\bdefinition\b[^"]*"[^>]*>(.*?)</div>"#;

// Definition source consumed by the record assembler
#[async_trait]
pub trait DefinitionFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, NomenError>;
}

/// Thin wrapper over `reqwest::Client` returning text bodies of successful responses.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: Client,
}

impl DocumentClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, NomenError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| NomenError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub async fn get_text(&self, url: &str) -> Result<String, NomenError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NomenError::fetch(url, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NomenError::fetch(url, format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| NomenError::fetch(url, format!("failed to read body: {}", e)))
    }
}

/// Pulls the definition text out of an HTML page.
#[derive(Debug, Clone)]
pub struct DefinitionExtractor {
    pattern: Regex,
}

impl DefinitionExtractor {
    pub fn new(pattern: &str) -> Result<Self, NomenError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            NomenError::ConfigError(format!("Invalid definition pattern: {}", e))
        })?;
        if pattern.captures_len() < 2 {
            return Err(NomenError::ConfigError(
                "Definition pattern must contain a capture group".to_string(),
            ));
        }
        Ok(Self { pattern })
    }

    pub fn extract(&self, document: &str) -> Option<String> {
        let fragment = self.pattern.captures(document)?.get(1)?.as_str();
        Some(html_to_text(fragment))
    }
}

impl Default for DefinitionExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_DEFINITION_PATTERN)
                .expect("default definition pattern is valid"),
        }
    }
}

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern is valid")
});

/// Strip tags and collapse whitespace. Entities are left encoded.
///
/// Tags are removed without inserting spaces so that `H<sub>2</sub>O` reads `H2O`.
pub fn html_to_text(fragment: &str) -> String {
    let stripped = TAGS.replace_all(fragment, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Decode numeric and common named entities.
pub fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // &amp; goes last so "&amp;lt;" stays "&lt;"
    decoded
        .replace("&nbsp;", " ")
        .replace("&commat;", "@")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub struct HttpDefinitionFetcher {
    client: DocumentClient,
    extractor: DefinitionExtractor,
}

impl HttpDefinitionFetcher {
    pub fn new(client: DocumentClient, extractor: DefinitionExtractor) -> Self {
        Self { client, extractor }
    }
}

#[async_trait]
impl DefinitionFetcher for HttpDefinitionFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NomenError> {
        if url.trim().is_empty() {
            return Err(NomenError::fetch(url, "entry has no reference URL"));
        }

        log::debug!("Fetching definition from {}", url);
        let document = self.client.get_text(url).await?;
        self.extractor
            .extract(&document)
            .ok_or_else(|| NomenError::fetch(url, "no definition found in document"))
    }
}
