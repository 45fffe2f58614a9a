pub mod chat;
pub mod health;

use axum::Router;

use crate::state::AppState;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(chat::routes(state))
}
