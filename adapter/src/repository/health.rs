use async_trait::async_trait;
use derive_new::new;

use kernel::repository::health::HealthCheckRepository;

use crate::database::DocumentStore;

#[derive(new)]
pub struct HealthCheckRepositoryImpl {
    db: DocumentStore,
}

#[async_trait]
impl HealthCheckRepository for HealthCheckRepositoryImpl {
    async fn check_db(&self) -> bool {
        self.db.ping().await
    }
}
