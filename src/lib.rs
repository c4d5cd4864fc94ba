pub mod collection;
pub mod config;
pub mod document;
pub mod engine;
pub mod errors;
pub mod features;
pub mod import;
pub mod locale;
pub mod logger;
pub mod query;
pub mod response;
pub mod store;
pub mod types;
pub mod utils;

mod test_support;

use std::path::Path;
use std::sync::Arc;

use crate::collection::Collection;
use crate::config::QueryConfig;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::features::{QueryTranslator, ResultSet};
use crate::locale::Catalog;
use crate::query::Populate;
use crate::response::{EmptyResultPolicy, ListMessages, RequestContext, ServiceResponse};

pub use crate::features::QueryDescriptor;
pub use crate::store::DocumentStore;

/// In-memory store plus the configuration and phrases list endpoints run with.
pub struct Database {
    engine: Arc<Engine>,
    config: QueryConfig,
    catalog: Catalog,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("collections", &self.engine.list_collection_names())
            .field("default_locale", &self.catalog.default_lang())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Built-in defaults and phrases, no files consulted.
    ///
    /// # Errors
    /// Only if the embedded phrase catalog is broken.
    pub fn new() -> Result<Self, DbError> {
        Self::with_config(QueryConfig::default())
    }

    /// Loads configuration (explicit path, `$DOCQUERY_CONFIG`, `./docquery.toml`, environment)
    /// and the phrase catalog it names.
    ///
    /// # Errors
    /// Returns config, TOML or locale loading errors.
    pub fn open(config_path: Option<&Path>) -> Result<Self, DbError> {
        Self::with_config(config::load_config(config_path)?)
    }

    /// # Errors
    /// Returns an error when the config is invalid or its locale file cannot be loaded.
    pub fn with_config(config: QueryConfig) -> Result<Self, DbError> {
        config.validate()?;
        let catalog = Catalog::load(&config)?;
        Ok(Self { engine: Arc::new(Engine::new()), config, catalog })
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        self.engine.create_collection(name)
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.engine.get_collection(name)
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.engine.delete_collection(name)
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        self.engine.list_collection_names()
    }

    /// Request-scoped context from the raw query string and language headers.
    #[must_use]
    pub fn request(
        &self,
        query_string: &str,
        detected_language: Option<&str>,
        accept_language: Option<&str>,
    ) -> RequestContext<'_> {
        RequestContext::from_request(&self.config, &self.catalog, query_string, detected_language, accept_language)
    }

    /// Runs a descriptor directly and returns the envelope.
    ///
    /// # Errors
    /// `BadRequest` for malformed input; store errors unchanged.
    pub async fn query(
        &self,
        collection: &str,
        descriptor: &QueryDescriptor,
        populate: Option<&Populate>,
    ) -> Result<ResultSet, DbError> {
        QueryTranslator::new(self.engine.as_ref(), &self.config).execute(collection, descriptor, populate).await
    }

    /// See [`response::list_resources`].
    ///
    /// # Errors
    /// Store errors unchanged.
    pub async fn list(
        &self,
        ctx: &RequestContext<'_>,
        collection: &str,
        populate: Option<&Populate>,
        messages: &ListMessages,
        policy: EmptyResultPolicy,
    ) -> Result<ServiceResponse, DbError> {
        response::list_resources(self.engine.as_ref(), ctx, collection, populate, messages, policy).await
    }
}
