pub mod connection_service;
pub mod metadata_service;

pub use connection_service::*;
pub use metadata_service::*;
