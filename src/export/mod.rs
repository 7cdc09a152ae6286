//! Model persistence module
//!
//! The fitted pipeline is written as a single binary artifact:
//! a bincode envelope with magic bytes, descriptive metadata, the encoded
//! model payload and a checksum of that payload.

mod serializer;

pub use serializer::{from_artifact_bytes, load_model, save_model, to_artifact_bytes, ModelMetadata};
