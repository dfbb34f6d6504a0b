//! invigil-core — Quiz session engine, scoring, and grade aggregation.
//!
//! This crate defines the data model, the session state machine with its
//! effect protocol, the integrity monitor, and the pure scoring and
//! gradebook functions that invigil hosts build on.

pub mod error;
pub mod grades;
pub mod model;
pub mod monitor;
pub mod quizfile;
pub mod schedule;
pub mod score;
pub mod session;
pub mod traits;
