use notes_indexer::{NotesAggregator, VersionControl};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<NotesAggregator>,
}

impl AppState {
    pub fn new(aggregator: Arc<NotesAggregator>) -> Self {
        Self { aggregator }
    }

    pub fn vcs(&self) -> &Arc<dyn VersionControl> {
        self.aggregator.vcs()
    }
}
