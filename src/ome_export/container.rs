//! Container writing module
//!
//! This module defines the encoder seam used by export sessions and provides
//! the OME-TIFF implementation of it.

mod ome_tiff_writer;
mod writer;
pub mod ome_xml;
pub mod types;

pub use ome_tiff_writer::OmeTiffWriter;
pub use types::{ContainerConfig, ContainerConfigBuilder, TiffCompression};
pub use writer::ContainerWriter;
