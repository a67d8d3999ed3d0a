//! Shared infrastructure for the inkline markup engine.
//!
//! This crate provides the pieces every other inkline crate leans on:
//! - **Pools** - fixed-capacity scratch buffers that never reallocate
//! - **Spans** - byte ranges into the markup source
//! - **Warning System** - colored, deduplicated terminal warnings

pub mod pool;
pub mod span;
pub mod warning;

pub use pool::{Pool, PoolFull};
pub use span::Span;
