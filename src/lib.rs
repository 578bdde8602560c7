//! Bookshelf application library
//!
//! Domain modules mounted by the `bookshelf` binary.

pub mod modules;

pub use modules::*;
