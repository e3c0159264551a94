use std::sync::Arc;

use adapter::{
    database::DocumentStore,
    kv::TokenStore,
    repository::{
        auth::AuthRepositoryImpl, book::BookRepositoryImpl, checkout::CheckoutRepositoryImpl,
        health::HealthCheckRepositoryImpl, reservation::ReservationRepositoryImpl,
        user::UserRepositoryImpl,
    },
};
use kernel::{
    repository::{
        auth::AuthRepository, book::BookRepository, checkout::CheckoutRepository,
        health::HealthCheckRepository, reservation::ReservationRepository, user::UserRepository,
    },
    service::circulation::CirculationService,
};
use shared::config::AppConfig;

// 依存の組み立てを 1 箇所に集めた DI コンテナ。axum の State として配る
#[derive(Clone)]
pub struct AppRegistry {
    book_repository: Arc<dyn BookRepository>,
    checkout_repository: Arc<dyn CheckoutRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    user_repository: Arc<dyn UserRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
    circulation_service: Arc<CirculationService>,
}

impl AppRegistry {
    pub fn new(db: DocumentStore, kv: Arc<TokenStore>, config: &AppConfig) -> Self {
        let book_repository: Arc<dyn BookRepository> =
            Arc::new(BookRepositoryImpl::new(db.clone()));
        let checkout_repository: Arc<dyn CheckoutRepository> =
            Arc::new(CheckoutRepositoryImpl::new(db.clone()));
        let reservation_repository: Arc<dyn ReservationRepository> =
            Arc::new(ReservationRepositoryImpl::new(db.clone()));
        let circulation_service = Arc::new(CirculationService::new(
            Arc::clone(&book_repository),
            Arc::clone(&checkout_repository),
            Arc::clone(&reservation_repository),
        ));
        Self {
            book_repository,
            checkout_repository,
            reservation_repository,
            user_repository: Arc::new(UserRepositoryImpl::new(db.clone())),
            auth_repository: Arc::new(AuthRepositoryImpl::new(db.clone(), kv, config.auth.ttl)),
            health_check_repository: Arc::new(HealthCheckRepositoryImpl::new(db)),
            circulation_service,
        }
    }

    pub fn book_repository(&self) -> Arc<dyn BookRepository> {
        Arc::clone(&self.book_repository)
    }

    pub fn checkout_repository(&self) -> Arc<dyn CheckoutRepository> {
        Arc::clone(&self.checkout_repository)
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        Arc::clone(&self.reservation_repository)
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.user_repository)
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        Arc::clone(&self.auth_repository)
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        Arc::clone(&self.health_check_repository)
    }

    pub fn circulation_service(&self) -> Arc<CirculationService> {
        Arc::clone(&self.circulation_service)
    }
}
