use crate::collection::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::query::{self, Filter, FindOptions, Populate};
use crate::store::DocumentStore;
use crate::types::{CollectionName, DocumentId};
use bson::Bson;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The embedded in-memory document store.
#[derive(Default)]
pub struct Engine {
    pub(crate) collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("collections", &self.list_collection_names()).finish()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named collection, creating it when absent.
    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        let mut cols = self.collections.write();
        cols.entry(name.to_string())
            .or_insert_with(|| {
                log::info!("created collection {name}");
                Arc::new(Collection::new(name))
            })
            .clone()
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn collection(&self, name: &str) -> Result<Arc<Collection>, DbError> {
        self.get_collection(name).ok_or_else(|| DbError::NoSuchCollection(name.to_string()))
    }

    fn populate(&self, docs: &mut [Document], spec: &Populate) -> Result<(), DbError> {
        let target = self.collection(&spec.from)?;
        let resolve = |id: DocumentId| -> Option<Bson> {
            target.find_document(&id).map(|d| {
                let data = match &spec.select {
                    Some(p) => query::apply_projection(&d.data, p),
                    None => d.data,
                };
                Bson::Document(data)
            })
        };
        for d in docs.iter_mut() {
            let Some(current) = query::get_path(&d.data, &spec.path) else {
                continue;
            };
            let expanded = match current {
                Bson::Array(items) => Bson::Array(
                    items.iter().filter_map(DocumentId::from_bson).filter_map(&resolve).collect(),
                ),
                single => match DocumentId::from_bson(single) {
                    Some(id) => resolve(id).unwrap_or(Bson::Null),
                    // not a reference; leave as is
                    None => continue,
                },
            };
            query::set_path(&mut d.data, &spec.path, expanded);
        }
        Ok(())
    }
}

impl DocumentStore for Engine {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        opts: &FindOptions,
    ) -> Result<Vec<Document>, DbError> {
        let col = self.collection(collection)?;
        let mut docs = query::find_docs(&col, filter, opts);
        if let Some(spec) = &opts.populate {
            self.populate(&mut docs, spec)?;
        }
        Ok(docs)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DbError> {
        let col = self.collection(collection)?;
        Ok(query::count_docs(&col, filter))
    }
}
