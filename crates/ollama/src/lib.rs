//! Client for the Ollama inference server and the streaming token relay.
//!
//! [`api::OllamaClient`] talks HTTP; [`relay`] turns the NDJSON body of a
//! streaming generate call into individual tokens.

pub mod api;
pub mod relay;

pub use api::{GenerateOptions, OllamaClient, OllamaError};
pub use relay::{
    relay_tokens, GenerateChunk, LineTooLong, NdjsonDecoder, RelayError, RelaySummary, SinkClosed,
    MAX_LINE_BYTES,
};
