//! Vector store integration for the tool catalog.
//!
//! [`store::VectorStoreClient`] is the downstream contract: index management,
//! batch embedding, and namespaced upsert/delete/query/fetch. Two
//! implementations ship here: [`pinecone::PineconeClient`] talks to the hosted
//! service over HTTPS and [`memory::InMemoryVectorStore`] keeps everything in
//! process for tests and offline use.

#![warn(missing_docs, clippy::pedantic)]

pub mod embeddings;
mod error;
pub mod filter;
pub mod memory;
pub mod pinecone;
pub mod store;

mod http_client;

pub use embeddings::{EmbedInputType, EmbeddingVector};
pub use error::{StoreError, StoreResult};
pub use filter::MetadataFilter;
pub use memory::InMemoryVectorStore;
pub use pinecone::PineconeClient;
pub use store::{
    IndexDescription, IndexSpec, IndexStats, NamespaceStats, VectorMatch, VectorQuery,
    VectorRecord, VectorStoreClient,
};
