//! LSID-style identifiers for model entities
//!
//! Every identifier is `<Kind>:<suffix>`. Plate entities use the well position
//! (row letter, column number) plus the field-of-view index in the suffix, so
//! two entities never share an identifier even across wells.

/// Letter label for a zero-based row: `A..Z`, then `AA, AB, ...`
pub fn row_label(row: usize) -> String {
    let mut label = String::new();
    let mut n = row + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        label.insert(0, char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    label
}

/// Number label for a zero-based column, starting at 1
pub fn column_label(column: usize) -> String {
    (column + 1).to_string()
}

/// `A:1` style suffix shared by everything living in one well
pub fn well_suffix(row: usize, column: usize) -> String {
    format!("{}:{}", row_label(row), column_label(column))
}

pub fn lsid(kind: &str, suffix: &str) -> String {
    format!("{kind}:{suffix}")
}

pub fn plate_id(plate: usize) -> String {
    lsid("Plate", &plate.to_string())
}

pub fn well_id(row: usize, column: usize) -> String {
    lsid("Well", &well_suffix(row, column))
}

fn fov_suffix(row: usize, column: usize, fov: usize) -> String {
    format!("{}:FOV:{fov}", well_suffix(row, column))
}

pub fn well_sample_id(row: usize, column: usize, fov: usize) -> String {
    lsid("WellSample", &fov_suffix(row, column, fov))
}

pub fn modulo_annotation_id(series: usize) -> String {
    lsid("Annotation", &format!("Modulo:{series}"))
}

/// Identifiers of the entities making up one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageIds {
    pub image: String,
    pub name: String,
    pub pixels: String,
    pub channel: String,
}

impl ImageIds {
    /// Identifiers for the sole image of a single-stack export
    pub fn single() -> Self {
        Self {
            image: lsid("Image", "0"),
            name: lsid("Image", "0"),
            pixels: lsid("Pixels", "0"),
            channel: lsid("Channel", "0:0"),
        }
    }

    /// Identifiers for field of view `fov` of the well at (`row`, `column`)
    pub fn field_of_view(row: usize, column: usize, fov: usize) -> Self {
        let suffix = fov_suffix(row, column, fov);
        Self {
            image: lsid("Image", &suffix),
            name: format!("{}{} FOV {fov}", row_label(row), column_label(column)),
            pixels: lsid("Pixels", &suffix),
            channel: lsid("Channel", &format!("{suffix}:0")),
        }
    }
}
