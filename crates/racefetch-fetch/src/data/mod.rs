//! Immutable configuration for racing and downloading.

pub mod options;

pub use options::FetchOptions;
