//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::BlogService;
use blog_core::ports::UserRepository;
use blog_core::service::Repositories;
use blog_infra::{DatabaseConnections, InMemoryStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    /// Account lookups for registration and login.
    pub users: Arc<dyn UserRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the state against Postgres when it is configured and reachable,
    /// otherwise against the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        let per_page = config.posts_per_page;

        #[cfg(feature = "postgres")]
        let connected = Self::connect(config)
            .await
            .map(|db| Self::from_repositories(db.repositories(), Some(db), per_page));

        #[cfg(not(feature = "postgres"))]
        let connected: Option<Self> = {
            tracing::info!("Running without postgres feature - using in-memory store");
            None
        };

        let state = connected.unwrap_or_else(|| Self::in_memory(per_page));

        tracing::info!(
            persistent = state.db.is_some(),
            posts_per_page = config.posts_per_page,
            "Application state initialized"
        );
        state
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Option<Arc<DatabaseConnections>> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
            return None;
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => Some(Arc::new(connections)),
            Err(e) => {
                tracing::error!("Failed to connect to database: {}. Using in-memory store.", e);
                None
            }
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(posts_per_page: u64) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_repositories(store.repositories(), None, posts_per_page)
    }

    pub fn from_repositories(
        repos: Repositories,
        db: Option<Arc<DatabaseConnections>>,
        posts_per_page: u64,
    ) -> Self {
        Self {
            users: repos.users.clone(),
            blog: Arc::new(BlogService::new(repos).with_page_size(posts_per_page)),
            db,
        }
    }
}
