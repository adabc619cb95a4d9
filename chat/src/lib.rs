//! # chat
//!
//! Terminal client for the support relay. Holds the conversation, sends it to
//! the relay's chat endpoint and streams the reply into the last assistant
//! message as bytes arrive.

pub mod net;
pub mod render;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;
