//! OpenAI-compatible chat completion backend.

mod client;
mod dto;

pub use client::OpenAiProvider;
