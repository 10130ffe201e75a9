pub mod balance;
pub mod error;
pub mod registry;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use balance::{Balance, FLAT_FEE};
pub use error::StateError;
pub use registry::{Data, Registry, Version};
pub use state::State;
pub use types::{AcceptedPayload, Description, Payload, Stake, Transfer, Validation};

// Convenient Result type for this crate
pub type Result<T> = std::result::Result<T, StateError>;
