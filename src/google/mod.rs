use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod csrf;
pub mod handlers;
pub mod profile;
pub mod resolve;

pub fn router() -> Router<AppState> {
    handlers::router()
}
