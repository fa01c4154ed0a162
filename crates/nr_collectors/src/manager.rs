use nr_core::Article;
use tracing::{info, warn};

use crate::collectors::Collector;

type BoxedCollector = Box<dyn Collector>;

/// Runs every registered collector and concatenates their results in registration order.
#[derive(Default)]
pub struct CollectorManager {
    collectors: Vec<BoxedCollector>,
}

impl CollectorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collector(&mut self, collector: BoxedCollector) {
        self.collectors.push(collector);
    }

    pub fn with_collector(mut self, collector: BoxedCollector) -> Self {
        self.add_collector(collector);
        self
    }

    pub fn collector_names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// A failing collector is logged and skipped; the others still contribute.
    pub async fn collect_all(&self) -> Vec<Article> {
        let mut articles = Vec::new();
        for collector in &self.collectors {
            match collector.collect().await {
                Ok(found) => {
                    info!("📰 {} collected {} articles", collector.name(), found.len());
                    articles.extend(found);
                }
                Err(e) => warn!("{} failed: {}", collector.name(), e),
            }
        }
        articles
    }
}
