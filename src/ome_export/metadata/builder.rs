use tracing::{debug, info, instrument};

use crate::ome_export::common::error::{ExportError, Result};
use crate::ome_export::metadata::config::{AcquisitionConfig, PlateLayout};
use crate::ome_export::metadata::identifiers::{self, ImageIds};
use crate::ome_export::metadata::types::{
    Channel, DimensionOrder, Image, MetadataModel, ModuloAnnotation, NamingConvention,
    PixelType, Pixels, Plane, Plate, Well, WellSample,
};
use crate::ome_export::metadata::{exposure, modulo, series};

/// Builds complete metadata models for single stacks and plates.
///
/// All validation happens before any entity is created, so a build either
/// returns a fully linked model or an error.
pub struct MetadataModelBuilder;

/// Shared per-image pieces derived once from the acquisition config
struct ImageTemplate {
    modulo: Option<ModuloAnnotation>,
    exposures: Option<Vec<(usize, f64)>>,
}

impl MetadataModelBuilder {
    #[instrument(skip(config), fields(width = config.width, height = config.height, timepoints = config.timepoints))]
    pub fn build_single_image(config: &AcquisitionConfig) -> Result<MetadataModel> {
        let template = Self::prepare(config)?;

        let image = Self::image(ImageIds::single(), 0, config, &template, config.description.clone());

        info!(
            modulo = image.modulo.is_some(),
            "Built single-image metadata model"
        );
        Ok(MetadataModel::new(vec![image], None))
    }

    #[instrument(skip(layout, config), fields(rows = layout.rows(), columns = layout.columns(), timepoints = config.timepoints))]
    pub fn build_plate(layout: &PlateLayout, config: &AcquisitionConfig) -> Result<MetadataModel> {
        Self::validate_layout(layout)?;
        let template = Self::prepare(config)?;

        let mut images = Vec::with_capacity(layout.total_fields_of_view());
        let mut wells = Vec::with_capacity(layout.rows() * layout.columns());

        for cell in series::map_wells(&layout.fov_grid) {
            let mut samples = Vec::with_capacity(cell.fields_of_view.len());

            for fov in &cell.fields_of_view {
                let ids = ImageIds::field_of_view(fov.row, fov.column, fov.sample);
                let image = Self::image(ids, fov.series, config, &template, None);
                samples.push(WellSample {
                    id: identifiers::well_sample_id(fov.row, fov.column, fov.sample),
                    index: fov.sample,
                    image_ref: image.id.clone(),
                    sequence_index: fov.series,
                });
                images.push(image);
            }

            debug!(
                well = cell.well,
                row = cell.row,
                column = cell.column,
                fields = samples.len(),
                "Declared well"
            );
            wells.push(Well {
                id: identifiers::well_id(cell.row, cell.column),
                row: cell.row,
                column: cell.column,
                samples,
            });
        }

        let plate = Plate {
            id: identifiers::plate_id(0),
            name: layout.name.clone(),
            description: config.description.clone(),
            rows: layout.rows(),
            columns: layout.columns(),
            row_naming: NamingConvention::Letter,
            column_naming: NamingConvention::Number,
            wells,
        };

        info!(
            wells = plate.wells.len(),
            images = images.len(),
            "Built plate metadata model"
        );
        Ok(MetadataModel::new(images, Some(plate)))
    }

    fn prepare(config: &AcquisitionConfig) -> Result<ImageTemplate> {
        if config.width == 0 || config.height == 0 {
            return Err(ExportError::InvalidDimensions(config.width, config.height));
        }
        if config.timepoints == 0 {
            return Err(ExportError::InvalidTimepoints(config.timepoints));
        }

        let modulo = config
            .delay_labels
            .as_deref()
            .map(|labels| modulo::annotate(config.timepoints, labels))
            .transpose()?;

        let exposures = exposure::associate(config.timepoints, config.exposure_times.as_deref());

        Ok(ImageTemplate { modulo, exposures })
    }

    fn validate_layout(layout: &PlateLayout) -> Result<()> {
        let columns = layout.columns();
        if layout.rows() == 0 || columns == 0 {
            return Err(ExportError::InvalidPlateLayout(format!(
                "plate must have at least one row and one column, got {}x{}",
                layout.rows(),
                columns
            )));
        }

        if let Some((row, cells)) = layout
            .fov_grid
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns)
        {
            return Err(ExportError::InvalidPlateLayout(format!(
                "row {} has {} columns, expected {}",
                row,
                cells.len(),
                columns
            )));
        }

        Ok(())
    }

    fn image(
        ids: ImageIds,
        series: usize,
        config: &AcquisitionConfig,
        template: &ImageTemplate,
        description: Option<String>,
    ) -> Image {
        let planes = (0..config.timepoints)
            .map(|t| Plane {
                the_t: t,
                the_c: 0,
                the_z: 0,
                exposure_time: template
                    .exposures
                    .as_ref()
                    .and_then(|table| table.get(t))
                    .map(|&(_, seconds)| seconds),
            })
            .collect();

        let pixels = Pixels {
            id: ids.pixels,
            dimension_order: DimensionOrder::Xyzct,
            pixel_type: PixelType::Uint16,
            big_endian: true,
            size_x: config.width,
            size_y: config.height,
            size_z: 1,
            size_c: 1,
            size_t: config.timepoints,
            channels: vec![Channel {
                id: ids.channel,
                samples_per_pixel: 1,
            }],
            planes,
        };

        Image {
            id: ids.image,
            name: ids.name,
            description,
            series,
            pixels,
            modulo: template.modulo.clone(),
        }
    }
}
