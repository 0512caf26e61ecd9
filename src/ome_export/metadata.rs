//! Metadata model construction
//!
//! Builds the plate/well/image/pixels/channel/plane description of an export
//! before any pixel data is written.

mod builder;
pub mod config;
pub mod exposure;
pub mod identifiers;
pub mod modulo;
pub mod series;
pub mod types;


pub use builder::MetadataModelBuilder;
pub use config::{AcquisitionConfig, AcquisitionConfigBuilder, PlateLayout};
pub use series::FieldOfViewIndex;
pub use types::{
    Channel, DimensionOrder, Image, MetadataModel, ModuloAnnotation, ModuloAxis,
    NamingConvention, PixelType, Pixels, Plane, Plate, Well, WellSample,
};
