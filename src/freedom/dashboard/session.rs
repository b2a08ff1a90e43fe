use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument};

use crate::freedom::dashboard::error::Result;
use crate::freedom::dashboard::facets::Facets;
use crate::freedom::dashboard::io::{self, SourceSpec};
use crate::freedom::dashboard::model::{CanonicalTable, RawTable};
use crate::freedom::dashboard::normalize::normalize;
use crate::freedom::dashboard::present::{
    PresentationOptions, RenderRequest, RenderedPage, render_page,
};

/// Normalized tables keyed by source identity.
///
/// Tables are handed out behind an [`Arc`] and never mutated, so one cache
/// can back any number of concurrent sessions. Entries live until
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear) is called.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<SourceSpec, Arc<CanonicalTable>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `source`, loading it from disk on a miss.
    pub fn get_or_load(&self, source: &SourceSpec) -> Result<Arc<CanonicalTable>> {
        self.get_or_load_with(source, || io::load(source))
    }

    /// Returns the cached table for `source`, calling `loader` on a miss.
    ///
    /// The cache is not locked while `loader` and the normalizer run. When
    /// two callers race on the same miss, the first table inserted wins and
    /// both get it. Load and schema errors are returned unchanged and nothing
    /// is cached.
    #[instrument(level = "debug", skip_all, fields(origin = %source.origin()))]
    pub fn get_or_load_with<F>(&self, source: &SourceSpec, loader: F) -> Result<Arc<CanonicalTable>>
    where
        F: FnOnce() -> Result<RawTable>,
    {
        if let Some(table) = self.entries().get(source) {
            debug!("dataset cache hit");
            return Ok(Arc::clone(table));
        }

        let loaded = Arc::new(normalize(&loader()?)?);
        let table = Arc::clone(
            self.entries()
                .entry(source.clone())
                .or_insert_with(|| loaded),
        );
        info!(records = table.len(), "dataset cached");
        Ok(table)
    }

    /// Drops the entry for `source`; returns whether one existed.
    pub fn invalidate(&self, source: &SourceSpec) -> bool {
        self.entries().remove(source).is_some()
    }

    /// Drops every entry, e.g. after the underlying files were replaced.
    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SourceSpec, Arc<CanonicalTable>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// State for one user: the shared table plus that user's presentation choices.
#[derive(Debug, Clone)]
pub struct Session {
    table: Arc<CanonicalTable>,
    options: PresentationOptions,
}

impl Session {
    pub fn new(table: Arc<CanonicalTable>, options: PresentationOptions) -> Self {
        Self { table, options }
    }

    /// Opens a session over the cached table for `source`.
    pub fn open(
        cache: &DatasetCache,
        source: &SourceSpec,
        options: PresentationOptions,
    ) -> Result<Self> {
        Ok(Self::new(cache.get_or_load(source)?, options))
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn options(&self) -> PresentationOptions {
        self.options
    }

    /// Returns a session with different presentation choices over the same table.
    pub fn with_options(&self, options: PresentationOptions) -> Self {
        Self::new(Arc::clone(&self.table), options)
    }

    pub fn facets(&self) -> Facets {
        Facets::from_table(&self.table)
    }

    /// Recomputes a page from scratch for the given request.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedPage> {
        render_page(&self.table, &self.options, request)
    }
}
