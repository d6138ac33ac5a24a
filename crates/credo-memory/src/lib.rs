// credo-memory — in-memory `UserStore` plus test doubles.
//
// The store backs the integration tests and small deployments that do not
// need persistence. Data is lost when the store is dropped.

pub mod doubles;
pub mod store;

pub use doubles::{CaptureNotifier, StaticIdentityVerifier};
pub use store::MemoryStore;
