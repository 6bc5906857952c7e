pub mod api;
pub mod config;
pub mod db;
pub mod session;
pub mod token;

pub use db::DbPool;

use std::sync::Arc;
use std::time::Duration;

use config::Config;
use session::SessionStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        // Sessions slide on the same deadline the tokens carry
        let ttl = Duration::from_secs(config.auth.token_ttl_minutes * 60);
        let sessions = Arc::new(SessionStore::new(ttl));
        Self {
            config,
            db,
            sessions,
        }
    }
}
