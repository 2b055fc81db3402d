//! Active rendering systems
//!
//! Light sources and how they reach the lit shader.

pub mod lighting;
