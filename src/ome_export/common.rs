//! Common utilities module
//!
//! This module contains shared utilities used across the export pipeline.

pub mod byte_order;
pub mod error;

pub use byte_order::{be_bytes_to_samples, samples_to_be_bytes};
pub use error::{ErrorKind, ExportError, Result};
