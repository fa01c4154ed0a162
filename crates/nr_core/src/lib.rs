pub mod delivery;
pub mod error;
pub mod models;
pub mod types;

pub use delivery::Delivery;
pub use error::{Error, Result};
pub use models::TextGenerator;
pub use types::{Article, Report};
