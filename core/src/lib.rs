//! Shared domain logic for the Destress intake service.
//!
//! Transport-agnostic: the conversation state machine is a pure function of
//! `(state, message)`, the catalog is immutable data, and the synthesizer
//! talks to the generation backend through the [`plan::TextGenerator`] trait.

pub mod catalog;
pub mod conversation;
pub mod error;
pub mod plan;
