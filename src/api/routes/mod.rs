//! API Routes
//!
//! Route handlers organized by functionality.

pub mod collect;
pub mod export;
pub mod health;
pub mod pages;
pub mod stats;
