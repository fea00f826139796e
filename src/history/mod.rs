pub mod handlers;
pub mod repo;

pub use repo::{get_history, list_entries, save_history, HistoryEntry, HistoryPoint};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::history_routes()
}
