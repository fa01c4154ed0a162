pub mod email;
pub mod file;
pub mod slack;

pub use email::{EmailDelivery, SmtpConfig};
pub use file::{FileDelivery, OutputFormat};
pub use slack::WebhookDelivery;

pub mod prelude {
    pub use super::{EmailDelivery, FileDelivery, WebhookDelivery};
    pub use nr_core::{Delivery, Error, Report, Result};
}
