//! Core types and state machines for BingeBox.
//!
//! No HTTP or database code lives here. The SQLite store and the terminal
//! client build on these types.

pub mod annotation;
pub mod book;
pub mod detail;
pub mod error;
pub mod image;
pub mod movie;
pub mod store;
pub mod view;

pub use error::{Error, Result};
