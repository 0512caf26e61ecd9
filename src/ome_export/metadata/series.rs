//! Series and well-sample index mapping for plate layouts
//!
//! Walks the field-of-view grid row-major, then by column, then by field index.
//! Series indices increase by one per field of view; the well index increases by
//! one per grid cell whether or not the cell holds any fields.

/// Position of one field of view in both the plate and the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOfViewIndex {
    pub row: usize,
    pub column: usize,
    /// Series index of the image holding this field
    pub series: usize,
    /// Row-major index of the well
    pub well: usize,
    /// Index of this field within its well
    pub sample: usize,
}

/// One grid cell together with the fields of view it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellCell {
    pub well: usize,
    pub row: usize,
    pub column: usize,
    pub fields_of_view: Vec<FieldOfViewIndex>,
}

pub fn map_wells(fov_grid: &[Vec<usize>]) -> Vec<WellCell> {
    let mut cells = Vec::new();
    let mut series = 0;
    let mut well = 0;

    for (row, columns) in fov_grid.iter().enumerate() {
        for (column, &fov_count) in columns.iter().enumerate() {
            let fields_of_view = (0..fov_count)
                .map(|sample| FieldOfViewIndex {
                    row,
                    column,
                    series: series + sample,
                    well,
                    sample,
                })
                .collect();
            series += fov_count;

            cells.push(WellCell {
                well,
                row,
                column,
                fields_of_view,
            });
            well += 1;
        }
    }

    cells
}

/// All fields of view in series order
pub fn map_fields_of_view(fov_grid: &[Vec<usize>]) -> Vec<FieldOfViewIndex> {
    map_wells(fov_grid)
        .into_iter()
        .flat_map(|cell| cell.fields_of_view)
        .collect()
}
