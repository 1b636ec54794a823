//! C1: one-shot calls to the upstream meta-search engine (§4.1).

pub mod client;
pub mod retry;

pub use client::{SearchClient, SearxngClient};
