mod dto;
pub mod handlers;
mod persist;
mod repo;

use crate::state::AppState;
use axum::Router;

pub use dto::User;
pub use repo::UserStore;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
