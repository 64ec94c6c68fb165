// Export route modules
pub mod action_items;
pub mod health;
pub mod mcp;
pub mod notes;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(mcp::routes(state.clone()))
        .merge(action_items::routes(state.clone()))
        .merge(notes::routes(state))
}
