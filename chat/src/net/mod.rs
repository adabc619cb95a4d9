//! Network side of the chat client: relay HTTP calls and body decoding.

pub mod decode;
pub mod relay;
