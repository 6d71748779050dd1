// Intent resolution: prompt contract, provider call, output validation,
// and the request coordinator that front-ends drive.
// All provider calls go through llm_client.

pub mod coordinator;
pub mod handlers;
pub mod models;
pub mod preprocess;
pub mod prompts;
pub mod remote;
pub mod resolver;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{Outcome, RequestCoordinator, RequestState, SettlementPolicy};
pub use models::Product;
pub use remote::HttpIntentClient;
pub use resolver::{IntentResolver, IntentSource, ResolveError};
