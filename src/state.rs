use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::users::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<UserStore>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub async fn init(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let store = Arc::new(UserStore::load(&config.users_file).await?);
        tracing::info!(
            path = %config.users_file.display(),
            records = store.len().await,
            "users loaded"
        );
        let metrics = Arc::new(Metrics::new()?);
        Ok(Self::from_parts(config, store, metrics))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<UserStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            store,
            metrics,
        }
    }

    #[cfg(test)]
    pub fn fake(users_file: &std::path::Path, users: Vec<crate::users::User>) -> Self {
        use crate::config::LogConfig;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: users_file.to_path_buf(),
            log: LogConfig {
                dir: ".".into(),
                error_file: "error.log".into(),
                combined_file: "combined.log".into(),
                filter: "info".into(),
                json_console: false,
            },
        });
        let store = Arc::new(UserStore::from_parts(users, users_file));
        let metrics = Arc::new(Metrics::new().expect("registry should build"));
        Self::from_parts(config, store, metrics)
    }
}
