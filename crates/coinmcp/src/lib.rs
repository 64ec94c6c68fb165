pub mod auth;
pub mod coingecko;
pub mod errors;
pub mod extract;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod router;
pub mod store;
