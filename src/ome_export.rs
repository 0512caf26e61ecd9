//! OME-TIFF export module
//!
//! This module provides a structured approach to exporting acquired pixel data,
//! with separate modules for metadata model construction, container writing,
//! and write-session orchestration.

pub mod common;
pub mod container;
pub mod metadata;
pub mod session;

pub use common::{
    ErrorKind,
    ExportError,
    Result,
};

pub use metadata::{
    AcquisitionConfig,
    MetadataModel,
    MetadataModelBuilder,
    PlateLayout,
};

pub use container::{
    ContainerConfig,
    ContainerWriter,
    OmeTiffWriter,
    TiffCompression,
};

pub use session::{
    ExportSession,
    SessionState,
    SessionStats,
};
