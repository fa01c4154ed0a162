pub mod assembler;
pub mod dedup;
pub mod markdown;
pub mod render;
pub mod similarity;
pub mod summary;
pub mod view;

pub use assembler::{generate_full_report, ReportAssembler, ReportOptions};
pub use dedup::{Deduplicator, DEFAULT_TITLE_SIMILARITY_THRESHOLD};
pub use markdown::{markdown_to_html, markdown_to_text};
pub use render::DocumentRenderer;
pub use summary::clean_summary;
pub use view::{truncate, ReportView};

pub mod prelude {
    pub use super::{Deduplicator, DocumentRenderer, ReportAssembler, ReportOptions, ReportView};
    pub use nr_core::{Article, Error, Report, Result, TextGenerator};
}
