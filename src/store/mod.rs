pub mod config_store;
pub mod session_store;

pub use config_store::{ConfigStore, JsonFileConfigStore, SystemSettings};
pub use session_store::{JsonFileStore, MemoryStore, SessionStore};
