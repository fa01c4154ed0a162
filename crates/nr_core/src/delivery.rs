use async_trait::async_trait;

use crate::types::Report;
use crate::Result;

#[async_trait]
pub trait Delivery: Send + Sync {
    /// Returns the name of the delivery channel
    fn name(&self) -> &str;

    /// Hands the report over to the channel
    async fn deliver(&self, report: &Report) -> Result<()>;
}
