// Adapters layer: concrete account stores behind the `AccountStore` port.

pub mod memory_store;
pub mod rest_store;

pub use memory_store::{AccountFixture, InMemoryAccountStore};
pub use rest_store::RestAccountStore;
