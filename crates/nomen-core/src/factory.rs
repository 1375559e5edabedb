//! Assembler factory for building a configured pipeline from NomenConfig

use crate::assembler::{AssemblerOptions, RecordAssembler};
use crate::config::NomenConfig;
use crate::dictionary::TermDictionary;
use crate::errors::NomenError;
use crate::fetcher::{
    DefinitionExtractor, DefinitionFetcher, DocumentClient, HttpDefinitionFetcher,
};
use crate::resolver::{ExternalLookup, HttpExternalLookup, ReferenceResolver};
use std::sync::Arc;
use std::time::Duration;

pub struct AssemblerFactory;

impl AssemblerFactory {
    /// Wire HTTP collaborators and resolver around an already loaded dictionary.
    pub fn create_from_config(
        config: &NomenConfig,
        dictionary: Arc<TermDictionary>,
    ) -> Result<RecordAssembler, NomenError> {
        config.validate()?;

        let client = DocumentClient::new(
            Duration::from_secs(config.fetch.timeout_secs),
            &config.fetch.user_agent,
        )?;
        let fetcher = Self::configure_fetcher(config, client.clone())?;
        let resolver = Self::configure_resolver(config, dictionary.clone(), client)?;

        log::info!(
            "Pipeline ready: {} resolution, {:?} unresolved policy, concurrency {}",
            config.resolution.mode,
            config.resolution.unresolved,
            config.fetch.concurrency
        );

        Ok(RecordAssembler::new(
            dictionary,
            fetcher,
            resolver,
            Self::configure_options(config),
        ))
    }

    fn configure_fetcher(
        config: &NomenConfig,
        client: DocumentClient,
    ) -> Result<Arc<dyn DefinitionFetcher>, NomenError> {
        let extractor = DefinitionExtractor::new(&config.fetch.definition_pattern)?;
        Ok(Arc::new(HttpDefinitionFetcher::new(client, extractor)))
    }

    fn configure_resolver(
        config: &NomenConfig,
        dictionary: Arc<TermDictionary>,
        client: DocumentClient,
    ) -> Result<ReferenceResolver, NomenError> {
        let resolution = &config.resolution;
        let external: Option<Arc<dyn ExternalLookup>> = if resolution.mode.needs_external() {
            Some(Arc::new(HttpExternalLookup::new(
                client,
                resolution.external_url_template.clone(),
                resolution.external_anchor.clone(),
            )))
        } else {
            None
        };
        ReferenceResolver::new(dictionary, resolution.mode, external)
    }

    fn configure_options(config: &NomenConfig) -> AssemblerOptions {
        AssemblerOptions {
            delimiters: config.markers.clone(),
            unresolved: config.resolution.unresolved,
            placeholder: config.resolution.placeholder.clone(),
            concurrency: config.fetch.concurrency,
            metadata_only: config.fetch.metadata_only,
        }
    }
}
