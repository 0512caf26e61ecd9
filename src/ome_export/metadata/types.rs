//! Metadata model types
//!
//! Entities are plain data with public fields; a [`MetadataModel`] only hands
//! out shared references, so nothing can be changed once the builder returns it.

/// Storage order of the dimensions in a Pixels block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionOrder {
    Xyzct,
}

impl DimensionOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionOrder::Xyzct => "XYZCT",
        }
    }
}

/// Pixel encoding of a Pixels block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Uint16,
}

impl PixelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelType::Uint16 => "uint16",
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelType::Uint16 => 2,
        }
    }
}

/// How plate rows or columns are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    Letter,
    Number,
}

impl NamingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingConvention::Letter => "letter",
            NamingConvention::Number => "number",
        }
    }
}

/// Dimension a modulo annotation subdivides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuloAxis {
    T,
}

impl ModuloAxis {
    /// Element name used inside the modulo annotation document
    pub fn element_name(&self) -> &'static str {
        match self {
            ModuloAxis::T => "ModuloAlongT",
        }
    }
}

/// Discrete labels (gate delays) attached to the time axis of one image
#[derive(Debug, Clone, PartialEq)]
pub struct ModuloAnnotation {
    pub axis: ModuloAxis,
    /// Modulo type, e.g. `lifetime`
    pub modulo_type: String,
    pub unit: String,
    pub type_description: String,
    /// `labels[t]` describes the plane with T index `t`
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub samples_per_pixel: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub the_t: usize,
    pub the_c: usize,
    pub the_z: usize,
    /// Exposure time in seconds
    pub exposure_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pixels {
    pub id: String,
    pub dimension_order: DimensionOrder,
    pub pixel_type: PixelType,
    pub big_endian: bool,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub channels: Vec<Channel>,
    pub planes: Vec<Plane>,
}

impl Pixels {
    /// Number of bytes one plane occupies in the declared pixel encoding
    pub fn plane_bytes(&self) -> usize {
        self.size_x as usize * self.size_y as usize * self.pixel_type.bytes_per_sample()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Linear index of this image in the container
    pub series: usize,
    pub pixels: Pixels,
    pub modulo: Option<ModuloAnnotation>,
}

impl Image {
    pub fn plane_count(&self) -> usize {
        self.pixels.planes.len()
    }
}

/// One field of view inside a well
#[derive(Debug, Clone, PartialEq)]
pub struct WellSample {
    pub id: String,
    /// Position of this sample within its well, starting at 0
    pub index: usize,
    pub image_ref: String,
    /// Series index of the referenced image
    pub sequence_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    pub id: String,
    pub row: usize,
    pub column: usize,
    pub samples: Vec<WellSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub row_naming: NamingConvention,
    pub column_naming: NamingConvention,
    /// Wells in row-major order, one per grid cell
    pub wells: Vec<Well>,
}

impl Plate {
    pub fn well(&self, row: usize, column: usize) -> Option<&Well> {
        self.wells.iter().find(|w| w.row == row && w.column == column)
    }
}

/// Complete, read-only description of one export
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataModel {
    images: Vec<Image>,
    plate: Option<Plate>,
}

impl MetadataModel {
    pub(crate) fn new(images: Vec<Image>, plate: Option<Plate>) -> Self {
        Self { images, plate }
    }

    /// Images ordered by series index
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, series: usize) -> Option<&Image> {
        self.images.get(series)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn plate(&self) -> Option<&Plate> {
        self.plate.as_ref()
    }

    pub fn is_plate(&self) -> bool {
        self.plate.is_some()
    }

    pub fn total_planes(&self) -> usize {
        self.images.iter().map(Image::plane_count).sum()
    }
}
