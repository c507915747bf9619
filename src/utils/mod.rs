pub mod error;
pub mod settings;
pub mod type_mapper;
