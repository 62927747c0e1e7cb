pub mod credentials;
pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod store;
