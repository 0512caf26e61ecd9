use ome_plate_export::logger;
use ome_plate_export::ome_export::{
    AcquisitionConfig, ContainerConfig, ExportSession, MetadataModelBuilder, PlateLayout,
    TiffCompression,
};

use tracing::{error, info};

const WIDTH: u32 = 128;
const HEIGHT: u32 = 128;
const DELAYS_PS: [&str; 4] = ["0", "1000", "2000", "3000"];

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting gated plate export...");

    let layout = PlateLayout::new(vec![vec![1, 0], vec![2, 1]]).with_name("Demo plate");
    let acquisition = AcquisitionConfig::builder(WIDTH, HEIGHT)
        .timepoints(DELAYS_PS.len())
        .description("Synthetic gated acquisition")
        .delay_labels(DELAYS_PS)
        .build();
    let model = MetadataModelBuilder::build_plate(&layout, &acquisition)?;

    let config = ContainerConfig::builder()
        .compression(TiffCompression::Lzw)
        .predictor(Some(2))
        .build();
    info!("Compression: {:?}", config.compression);

    let mut session = ExportSession::new("plate.ome.tif", config);
    let series_count = model.image_count();
    session.open(model)?;

    let samples = (WIDTH * HEIGHT) as usize;
    for series in 0..series_count {
        for (t, _) in DELAYS_PS.iter().enumerate() {
            // Decaying intensity along the gate delays
            let value = (4000 >> t) as u16 + series as u16;
            if let Err(e) = session.write_samples(series, t, &vec![value; samples]) {
                error!("Plane {} of series {} not exported: {}", t, series, e);
            }
        }
    }

    match session.close() {
        Ok(()) => info!("Export successful! {}", session.stats()),
        Err(e) => error!("Export failed: {}", e),
    }

    Ok(())
}
