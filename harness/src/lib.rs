pub mod constants;
pub mod context;
pub mod errors;
pub mod expect;
pub mod harness;
pub mod intercept;
pub mod net;
pub mod timeout;
pub mod webhook;

// Re-export commonly used types
pub use context::Context;
pub use errors::HarnessError;
pub use expect::Expect;
pub use harness::Harness;
pub use intercept::{InterceptScope, Interceptor};
pub use net::MockNetwork;
pub use webhook::{Application, Delivery, WebhookRouter};
