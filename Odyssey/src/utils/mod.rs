//! Utility functions

pub mod cursor;

pub use cursor::BinaryCursor;
