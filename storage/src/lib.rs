pub mod chunk;
pub mod chunk_store;
pub mod error;
pub mod integrity;
