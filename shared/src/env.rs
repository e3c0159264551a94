use std::env;

pub enum Environment {
    Development,
    Production,
}

// 実行環境の判別。ENV が未設定の場合はビルドプロファイルに従う
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = Environment::Development;
    #[cfg(not(debug_assertions))]
    let default_env = Environment::Production;

    match env::var("ENV") {
        Err(_) => default_env,
        Ok(v) => match v.to_lowercase().as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        },
    }
}
