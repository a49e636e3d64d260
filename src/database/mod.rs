pub mod connection;
#[cfg(test)]
pub mod memory_store;
pub mod mongo_store;
pub mod repositories;

#[cfg(test)]
pub use memory_store::MemoryStore;
pub use mongo_store::MongoStore;
pub use repositories::{
    ChatRepository, CredentialRepository, PasswordResetRepository, ProfileRepository,
};
