// Embeddings module
// Client for the remote embedding deployment.

pub mod client;

pub use client::{Embedder, EmbeddingClient};
