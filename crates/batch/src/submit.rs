use async_trait::async_trait;
use daon_client::error::Result;
use daon_client::{Client, License, Receipt};
use daon_work::Work;

/// Something that can register works: the live path and its dry-run twin.
#[async_trait]
pub trait Submit: Send + Sync {
    async fn protect(&self, work: &Work, license: License) -> Result<Receipt>;
    fn simulate(&self, work: &Work, license: License) -> Receipt;
}

#[async_trait]
impl Submit for Client {
    async fn protect(&self, work: &Work, license: License) -> Result<Receipt> {
        Client::protect(self, work, license).await
    }

    fn simulate(&self, work: &Work, license: License) -> Receipt {
        Client::simulate(self, work, license)
    }
}
