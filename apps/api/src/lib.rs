pub mod config;
pub mod errors;
pub mod intent;
pub mod llm_client;
pub mod routes;
pub mod state;
