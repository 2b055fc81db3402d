//! Resource records
//!
//! Passive data the pipeline reads but never owns.

pub mod materials;
