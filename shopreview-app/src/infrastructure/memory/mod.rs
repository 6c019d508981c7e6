mod identity;
mod store;

pub use identity::InMemoryIdentity;
pub use store::InMemoryStore;
