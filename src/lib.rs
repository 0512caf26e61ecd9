//! Export of incrementally acquired 16-bit planes to OME-TIFF, either as a
//! single time-resolved stack or as a plate of wells and fields of view.

pub mod logger;
pub mod ome_export;
