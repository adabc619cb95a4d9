//! Client-side state.
//!
//! DESIGN
//! ======
//! The conversation is an owned store with a small mutation API, so the
//! "replace the last message" step is a single testable operation instead of
//! ad-hoc vector splicing in the send loop.

pub mod conversation;
