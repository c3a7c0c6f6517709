//! Core data pipeline for a retail sales dashboard.
//!
//! A loaded spreadsheet flows through a fixed linear sequence: column-role
//! resolution, numeric normalization, row filtering, group-by aggregation.
//! Each stage takes the previous stage's output by reference together with
//! its configuration and returns a new value; no stage mutates its input.

pub mod aggregate;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod table;
