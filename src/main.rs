use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adapter::{database::DocumentStore, kv::TokenStore};
use kernel::model::{role::Role, user::event::CreateUser};
use registry::AppRegistry;
use shared::{
    config::AppConfig,
    env::{which, Environment},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    bootstrap().await
}

fn init_logger() {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // 本番はログ収集基盤に流しやすいよう JSON 形式で出力する
    match which() {
        Environment::Development => {
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
        }
        Environment::Production => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .init();
        }
    }
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let db = DocumentStore::new();
    let kv = Arc::new(TokenStore::new());
    let registry = AppRegistry::new(db, kv, &app_config);

    seed_admin(&registry, &app_config).await?;

    let app = api::route::routes(registry).layer(TraceLayer::new_for_http());

    let ip: IpAddr = app_config
        .server
        .host
        .parse()
        .context("HOST には IP アドレスを指定してください")?;
    let addr = SocketAddr::new(ip, app_config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
}

// 管理者は起動時にサーバ側で用意する。登録 API からは一般利用者しか作れない
async fn seed_admin(registry: &AppRegistry, config: &AppConfig) -> Result<()> {
    let users = registry.user_repository();
    if users.find_by_email(&config.admin.email).await?.is_none() {
        users
            .create(CreateUser {
                name: config.admin.name.clone(),
                email: config.admin.email.clone(),
                password: config.admin.password.clone(),
                role: Role::Admin,
            })
            .await?;
        info!(email = %config.admin.email, "created initial admin user");
    }
    Ok(())
}
