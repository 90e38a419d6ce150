//! Local inference engine backend.

mod client;
mod dto;

pub use client::OllamaProvider;
