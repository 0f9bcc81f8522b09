//! Bulk (re)indexing: walk the relational store by id and push every POI
//! through [`VectorSearchEngine::index_pois`].

use indicatif::{ProgressBar, ProgressStyle};

use geopoi_core::traits::PoiStore;
use geopoi_core::Result;

use crate::schema::INDEX_BATCH_SIZE;
use crate::search::VectorSearchEngine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexStats {
    pub scanned: usize,
    pub indexed: usize,
}

pub struct Reindexer<'a> {
    store: &'a dyn PoiStore,
    engine: &'a VectorSearchEngine,
    batch_size: usize,
    progress: bool,
}

impl<'a> Reindexer<'a> {
    pub fn new(store: &'a dyn PoiStore, engine: &'a VectorSearchEngine) -> Self {
        Self { store, engine, batch_size: INDEX_BATCH_SIZE, progress: false }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Draw a spinner on stderr while running.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&self) -> Result<ReindexStats> {
        self.engine.ensure_collection().await?;
        let pb = if self.progress { ProgressBar::new_spinner() } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} POIs {msg}") {
            pb.set_style(style);
        }

        let mut stats = ReindexStats::default();
        let mut after = None;
        loop {
            let page = self.store.scan(after, self.batch_size).await?;
            let Some(last) = page.last() else { break };
            after = Some(last.id);
            stats.scanned += page.len();
            stats.indexed += self.engine.index_pois(&page).await?;
            pb.set_position(stats.scanned as u64);
            if page.len() < self.batch_size {
                break;
            }
        }
        pb.finish_with_message("done");
        tracing::info!(scanned = stats.scanned, indexed = stats.indexed, "reindex finished");
        Ok(stats)
    }
}
