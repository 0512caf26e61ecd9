//! Acquisition geometry and plate layout configuration

/// Everything the model builder needs to describe one acquisition.
///
/// Built once and handed to a single build call; there is no partially
/// initialised state to get wrong.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Plane width in pixels
    pub width: u32,
    /// Plane height in pixels
    pub height: u32,
    /// Number of timepoints (planes) per image
    pub timepoints: usize,
    /// Free-text description attached to the image (or plate)
    pub description: Option<String>,
    /// Gate delay labels for the modulo annotation, one per timepoint
    pub delay_labels: Option<Vec<String>>,
    /// Exposure time per timepoint, in seconds
    pub exposure_times: Option<Vec<f64>>,
}

impl AcquisitionConfig {
    pub fn builder(width: u32, height: u32) -> AcquisitionConfigBuilder {
        AcquisitionConfigBuilder {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Builder for AcquisitionConfig
#[derive(Default)]
pub struct AcquisitionConfigBuilder {
    width: u32,
    height: u32,
    timepoints: Option<usize>,
    description: Option<String>,
    delay_labels: Option<Vec<String>>,
    exposure_times: Option<Vec<f64>>,
}

impl AcquisitionConfigBuilder {
    pub fn timepoints(mut self, timepoints: usize) -> Self {
        self.timepoints = Some(timepoints);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn delay_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delay_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn exposure_times(mut self, exposure_times: Vec<f64>) -> Self {
        self.exposure_times = Some(exposure_times);
        self
    }

    pub fn build(self) -> AcquisitionConfig {
        AcquisitionConfig {
            width: self.width,
            height: self.height,
            // A non-FLIM stack is a single plane
            timepoints: self.timepoints.unwrap_or(1),
            description: self.description,
            delay_labels: self.delay_labels,
            exposure_times: self.exposure_times,
        }
    }
}

pub const DEFAULT_PLATE_NAME: &str = "Plate";

/// Field-of-view counts for every well of a plate.
///
/// `fov_grid[row][column]` is the number of fields of view imaged in that well;
/// the grid's shape is the plate's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateLayout {
    pub fov_grid: Vec<Vec<usize>>,
    pub name: String,
}

impl PlateLayout {
    pub fn new(fov_grid: Vec<Vec<usize>>) -> Self {
        Self {
            fov_grid,
            name: DEFAULT_PLATE_NAME.to_string(),
        }
    }

    /// A `rows` x `columns` plate with the same number of fields in every well
    pub fn uniform(rows: usize, columns: usize, fields_per_well: usize) -> Self {
        Self::new(vec![vec![fields_per_well; columns]; rows])
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn rows(&self) -> usize {
        self.fov_grid.len()
    }

    pub fn columns(&self) -> usize {
        self.fov_grid.first().map_or(0, Vec::len)
    }

    pub fn total_fields_of_view(&self) -> usize {
        self.fov_grid.iter().flatten().sum()
    }
}
