//! LLM Service Module
//!
//! Chat-completion access for the help desk. The assistant only talks to the
//! `ChatCompletion` trait; Gemini is the one production provider.
//!
//! # Architecture
//! ```text
//! ┌──────────────────┐
//! │  ChatCompletion  │  ← Trait (generic interface)
//! └────────┬─────────┘
//!          │
//!    ┌─────┴─────┐
//!    ▼           ▼
//! ┌──────┐  ┌──────────┐
//! │Gemini│  │ MockChat │
//! │Client│  │ (tests)  │
//! └──────┘  └──────────┘
//! ```

mod client;
mod models;
mod service;

pub use client::GeminiClient;
pub use models::{ChatMessage, ChatRequest, ChatRole, GenerationConfig, LLMError};
pub use service::ChatCompletion;

#[cfg(test)]
pub(crate) mod mock;
