//! # Medresearch Tools
//!
//! HTTP clients backing the capability seams: a chat-completion client for
//! the [`crate::models::LanguageModel`] seam and a PubMed E-utilities
//! client for the [`crate::models::SearchProvider`] seam.

pub mod chat;
pub mod pubmed;

pub use chat::ChatClient;
pub use pubmed::PubMedClient;
