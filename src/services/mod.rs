pub mod normalizer;
pub mod poller;

pub use normalizer::Normalizer;
pub use poller::{StatusPoller, StatusSource};
