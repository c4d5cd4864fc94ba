//! Query descriptor to store calls.
//!
//! One `execute` issues a count over the filtered set and then a paginated find. The two calls are
//! not atomic; a write landing between them shows up as read skew.

use std::time::Instant;

use crate::config::QueryConfig;
use crate::errors::DbError;
use crate::query::{Filter, FindOptions, Populate, Projection, SortSpec, parse_filter_json, parse_filter_object};
use crate::store::DocumentStore;
use crate::utils::num::{millis_u64, u64_to_usize_saturating, usize_to_u64};

use super::descriptor::QueryDescriptor;
use super::envelope::ResultSet;
use super::pagination::{PageMetadata, PaginationState};
use super::select::parse_select;
use super::sort::parse_sort;

/// Everything a descriptor resolves to before any store call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Vec<SortSpec>,
    pub pagination: PaginationState,
}

impl QueryPlan {
    /// Find options for this plan's page.
    #[must_use]
    pub fn find_options(&self, populate: Option<&Populate>) -> FindOptions {
        FindOptions {
            projection: self.projection.clone(),
            sort: (!self.sort.is_empty()).then(|| self.sort.clone()),
            skip: Some(u64_to_usize_saturating(self.pagination.skip)),
            limit: Some(u64_to_usize_saturating(self.pagination.limit)),
            populate: populate.cloned(),
        }
    }
}

/// Turns query descriptors into store calls against one backend.
pub struct QueryTranslator<'a, S: DocumentStore> {
    store: &'a S,
    config: &'a QueryConfig,
}

impl<'a, S: DocumentStore> QueryTranslator<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, config: &'a QueryConfig) -> Self {
        Self { store, config }
    }

    /// Resolves filter, projection, sort and page window without touching the store.
    ///
    /// # Errors
    /// Returns `BadRequest` for malformed filter or select input.
    pub fn plan(&self, descriptor: &QueryDescriptor) -> Result<QueryPlan, DbError> {
        let limits = self.config.filter_limits();
        let mut parts = vec![parse_filter_object(&descriptor.residual_filter()?, &limits)?];
        if let Some(raw) = descriptor.filter() {
            parts.push(parse_filter_json(raw, &limits)?);
        }
        let projection = match descriptor.select() {
            Some(raw) => parse_select(raw, self.config.max_projection_fields)?,
            None => None,
        };
        let sort = descriptor.sort().map(|raw| parse_sort(raw, self.config.max_sort_fields)).unwrap_or_default();
        let pagination = PaginationState::resolve(
            descriptor.page(),
            descriptor.limit(),
            self.config.default_limit,
            self.config.max_limit,
        );
        Ok(QueryPlan { filter: Filter::and(parts), projection, sort, pagination })
    }

    /// Runs the descriptor against `collection` and wraps the page with count metadata.
    ///
    /// # Errors
    /// `BadRequest` for malformed input; store errors are returned unchanged.
    pub async fn execute(
        &self,
        collection: &str,
        descriptor: &QueryDescriptor,
        populate: Option<&Populate>,
    ) -> Result<ResultSet, DbError> {
        let start = Instant::now();
        let plan = self.plan(descriptor)?;
        log::debug!("query on {collection}: {plan:?}");

        let total = self.store.count(collection, &plan.filter).await?;
        let records = self.store.find(collection, &plan.filter, &plan.find_options(populate)).await?;
        let metadata = PageMetadata::compute(total, &plan.pagination);

        let elapsed = millis_u64(start.elapsed());
        crate::dev6!(
            "{{\"bench\":\"query\",\"op\":\"translate\",\"collection\":\"{}\",\"duration_ms\":{},\"total\":{},\"result_count\":{},\"page\":{},\"limit\":{}}}",
            collection,
            elapsed,
            total,
            usize_to_u64(records.len()),
            plan.pagination.page,
            plan.pagination.limit
        );
        log::info!(
            target: crate::logger::METRICS_TARGET,
            "list collection={collection} total={total} returned={} duration_ms={elapsed}",
            records.len()
        );
        if elapsed >= self.config.slow_query_ms {
            log::warn!("slow query on {collection}: {elapsed} ms (threshold {} ms)", self.config.slow_query_ms);
        }
        Ok(ResultSet::new(records, metadata))
    }
}
