use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let server = ServerConfig {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8080")
                .parse()
                .context("PORT にはポート番号を指定してください")?,
        };
        let auth = AuthConfig {
            // アクセストークンの有効期限。既定は 1 日
            ttl: env_or("AUTH_TOKEN_TTL", "86400")
                .parse()
                .context("AUTH_TOKEN_TTL には秒数を指定してください")?,
        };
        let admin = AdminConfig {
            name: env_or("ADMIN_NAME", "Admin"),
            email: env_or("ADMIN_EMAIL", "admin@example.com"),
            password: env_or("ADMIN_PASSWORD", "passw0rd"),
        };
        Ok(Self {
            server,
            auth,
            admin,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub ttl: u64,
}

// 起動時に 1 人だけ作成する管理者アカウント。
// 管理者権限はサーバ側で付与するものであり、登録 API からは作れない。
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}
