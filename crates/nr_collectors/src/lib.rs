pub mod collectors;
pub mod image;
pub mod manager;

pub use collectors::site::{SiteCollector, SiteConfig, SiteSelectors};
pub use collectors::tavily::{SearchOptions, TavilyCollector};
pub use collectors::Collector;
pub use image::{extract_og_image, ImageEnricher};
pub use manager::CollectorManager;

pub mod prelude {
    pub use super::collectors::Collector;
    pub use super::{CollectorManager, ImageEnricher, SiteCollector, TavilyCollector};
    pub use nr_core::{Article, Error, Result};
}
