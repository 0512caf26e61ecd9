use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use tiff::encoder::{Compression, TiffEncoder, colortype};
use tiff::tags::{Predictor, Tag};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ome_export::common::byte_order::be_bytes_to_samples;
use crate::ome_export::common::error::{ExportError, Result};
use crate::ome_export::container::ome_xml;
use crate::ome_export::container::types::{ContainerConfig, TiffCompression};
use crate::ome_export::container::writer::ContainerWriter;
use crate::ome_export::metadata::{MetadataModel, PixelType};

/// Where one series lives in the IFD chain
#[derive(Debug, Clone, Copy)]
struct SeriesLayout {
    width: u32,
    height: u32,
    planes: usize,
    first_ifd: usize,
}

impl SeriesLayout {
    fn plane_samples(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn plane_bytes(&self) -> usize {
        self.plane_samples() * PixelType::Uint16.bytes_per_sample()
    }

    fn contains_ifd(&self, ifd: usize) -> bool {
        ifd >= self.first_ifd && ifd < self.first_ifd + self.planes
    }
}

/// Destination of encoded planes, one IFD per call
trait PlaneSink: Send {
    fn append_plane(
        &mut self,
        series: &SeriesLayout,
        header: Option<(&str, &str)>,
        samples: &[u16],
    ) -> tiff::TiffResult<()>;
}

impl PlaneSink for TiffEncoder<File> {
    /// The first IFD also carries the OME-XML and software tags.
    fn append_plane(
        &mut self,
        series: &SeriesLayout,
        header: Option<(&str, &str)>,
        samples: &[u16],
    ) -> tiff::TiffResult<()> {
        let mut image = self.new_image::<colortype::Gray16>(series.width, series.height)?;
        if let Some((description, software)) = header {
            image.encoder().write_tag(Tag::ImageDescription, description)?;
            image.encoder().write_tag(Tag::Software, software)?;
        }
        image.write_data(samples)
    }
}

struct OpenOutput {
    sink: Box<dyn PlaneSink>,
    sync_handle: File,
    path: PathBuf,
    /// Next IFD to be appended; everything before it is on disk
    next_ifd: usize,
    /// Planes that arrived ahead of `next_ifd`, keyed by IFD
    staged: BTreeMap<usize, Vec<u16>>,
    staged_bytes: usize,
}

/// Writes a bound metadata model and its planes as a single OME-TIFF file.
///
/// Every plane becomes one 16-bit greyscale IFD, stored in series order. The
/// TIFF encoder can only append, so planes delivered ahead of their turn are
/// held back until the gap before them is filled. Planes that never arrive are
/// written as zeros on close, keeping the file consistent with its metadata.
///
/// Held planes stay in memory until they can be appended. Delivering series in
/// reverse order keeps nearly the whole dataset in RAM, so large plates should
/// set [`ContainerConfig::max_staged_bytes`]; a plane that would exceed the
/// limit is rejected with a `PlaneWrite` error.
pub struct OmeTiffWriter {
    config: ContainerConfig,
    layout: Vec<SeriesLayout>,
    ome_xml: Option<String>,
    output: Option<OpenOutput>,
    current_series: usize,
}

impl OmeTiffWriter {
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            layout: Vec::new(),
            ome_xml: None,
            output: None,
            current_series: 0,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.output.is_some()
    }

    /// Number of planes held in memory waiting for earlier planes
    pub fn staged_planes(&self) -> usize {
        self.output.as_ref().map_or(0, |output| output.staged.len())
    }

    /// The OME-XML document of the bound model
    pub fn ome_xml(&self) -> Option<&str> {
        self.ome_xml.as_deref()
    }

    fn total_planes(&self) -> usize {
        self.layout.iter().map(|series| series.planes).sum()
    }

    fn compression(&self) -> Compression {
        match self.config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Deflate => Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Balanced,
            ),
        }
    }

    fn create_encoder(&self, path: &Path) -> Result<OpenOutput> {
        let file = File::create(path).map_err(|e| {
            ExportError::EncoderBinding(format!("{}: {}", path.display(), e))
        })?;
        let sync_handle = file.try_clone().map_err(|e| {
            ExportError::EncoderBinding(format!("{}: {}", path.display(), e))
        })?;

        let mut encoder = TiffEncoder::new(file)
            .map_err(|e| ExportError::EncoderBinding(e.to_string()))?
            .with_compression(self.compression());

        if let Some(predictor_val) = self.config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        Ok(OpenOutput {
            sink: Box::new(encoder),
            sync_handle,
            path: path.to_path_buf(),
            next_ifd: 0,
            staged: BTreeMap::new(),
            staged_bytes: 0,
        })
    }
}

impl Default for OmeTiffWriter {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

fn series_for_ifd(layout: &[SeriesLayout], ifd: usize) -> Option<(usize, SeriesLayout)> {
    layout
        .iter()
        .copied()
        .enumerate()
        .find(|(_, series)| series.contains_ifd(ifd))
}

impl OpenOutput {
    /// Appends one plane as the next IFD
    fn append(
        &mut self,
        series: &SeriesLayout,
        ome_xml: &str,
        software: &str,
        samples: &[u16],
    ) -> tiff::TiffResult<()> {
        let header = (self.next_ifd == 0).then_some((ome_xml, software));
        self.sink.append_plane(series, header, samples)?;
        self.next_ifd += 1;
        Ok(())
    }

    fn stage(&mut self, ifd: usize, samples: Vec<u16>) {
        self.staged_bytes += samples.len() * PixelType::Uint16.bytes_per_sample();
        self.staged.insert(ifd, samples);
    }

    fn unstage(&mut self, ifd: usize) -> Option<Vec<u16>> {
        let samples = self.staged.remove(&ifd)?;
        self.staged_bytes -= samples.len() * PixelType::Uint16.bytes_per_sample();
        Some(samples)
    }

    /// Appends staged planes while they continue the IFD chain.
    ///
    /// A plane that fails to encode goes back to staging and is retried by the
    /// next write or by close.
    fn drain_staged(&mut self, layout: &[SeriesLayout], ome_xml: &str, software: &str) {
        while let Some(samples) = self.unstage(self.next_ifd) {
            let ifd = self.next_ifd;
            let Some((series_index, series)) = series_for_ifd(layout, ifd) else {
                self.stage(ifd, samples);
                break;
            };
            let plane = ifd - series.first_ifd;
            if let Err(e) = self.append(&series, ome_xml, software, &samples) {
                warn!(series = series_index, plane, ifd, error = %e, "Failed to write staged plane, keeping it staged");
                self.stage(ifd, samples);
                break;
            }
            debug!(series = series_index, plane, ifd, "Wrote staged plane");
        }
    }
}

impl ContainerWriter for OmeTiffWriter {
    fn bind_metadata(&mut self, model: &MetadataModel) -> Result<()> {
        if self.output.is_some() {
            return Err(ExportError::EncoderBinding(
                "cannot bind a new model while the output is open".to_string(),
            ));
        }
        if model.image_count() == 0 {
            return Err(ExportError::EncoderBinding(
                "model declares no images".to_string(),
            ));
        }

        let mut layout = Vec::with_capacity(model.image_count());
        let mut first_ifd = 0;
        for image in model.images() {
            let pixels = &image.pixels;
            if pixels.pixel_type != PixelType::Uint16 {
                return Err(ExportError::EncoderBinding(format!(
                    "{}: unsupported pixel type {}",
                    image.id,
                    pixels.pixel_type.as_str()
                )));
            }
            if pixels.channels.iter().any(|c| c.samples_per_pixel != 1) {
                return Err(ExportError::EncoderBinding(format!(
                    "{}: only single-sample channels are supported",
                    image.id
                )));
            }
            if image.plane_count() == 0 {
                return Err(ExportError::EncoderBinding(format!(
                    "{}: image declares no planes",
                    image.id
                )));
            }

            layout.push(SeriesLayout {
                width: pixels.size_x,
                height: pixels.size_y,
                planes: image.plane_count(),
                first_ifd,
            });
            first_ifd += image.plane_count();
        }

        let uuid = format!("urn:uuid:{}", Uuid::new_v4());
        let xml = ome_xml::render(model, &uuid)?;

        debug!(
            series = layout.len(),
            planes = first_ifd,
            xml_bytes = xml.len(),
            "Bound metadata model"
        );
        self.layout = layout;
        self.ome_xml = Some(xml);
        self.current_series = 0;
        Ok(())
    }

    fn open_output(&mut self, path: &Path) -> Result<()> {
        if self.ome_xml.is_none() {
            return Err(ExportError::EncoderBinding(
                "no metadata model bound".to_string(),
            ));
        }
        if self.output.is_some() {
            return Err(ExportError::EncoderBinding(
                "output is already open".to_string(),
            ));
        }

        let output = match self.create_encoder(path) {
            Ok(output) => output,
            Err(e) => {
                // Don't leave a truncated file behind
                if path.exists() {
                    if let Err(remove_err) = std::fs::remove_file(path) {
                        warn!(path = %path.display(), error = %remove_err, "Failed to remove partial output");
                    }
                }
                return Err(e);
            }
        };

        info!(path = %path.display(), planes = self.total_planes(), "Opened OME-TIFF output");
        self.output = Some(output);
        self.current_series = 0;
        Ok(())
    }

    fn select_series(&mut self, series: usize) -> Result<()> {
        if self.output.is_none() {
            return Err(ExportError::SeriesSwitch {
                series,
                reason: "output is not open".to_string(),
            });
        }
        if series >= self.layout.len() {
            return Err(ExportError::SeriesSwitch {
                series,
                reason: format!("model declares {} series", self.layout.len()),
            });
        }

        debug!(from = self.current_series, to = series, "Switching series");
        self.current_series = series;
        Ok(())
    }

    fn write_plane_bytes(&mut self, plane_index: usize, bytes: &[u8]) -> Result<()> {
        let series_index = self.current_series;
        let plane_error = |reason: String| ExportError::PlaneWrite {
            series: series_index,
            plane: plane_index,
            reason,
        };

        let (Some(output), Some(ome_xml)) = (self.output.as_mut(), self.ome_xml.as_deref()) else {
            return Err(plane_error("output is not open".to_string()));
        };
        let series = self.layout[series_index];

        if plane_index >= series.planes {
            return Err(plane_error(format!(
                "series declares {} planes",
                series.planes
            )));
        }
        if bytes.len() != series.plane_bytes() {
            return Err(plane_error(format!(
                "expected {} bytes for a {}x{} uint16 plane, got {}",
                series.plane_bytes(),
                series.width,
                series.height,
                bytes.len()
            )));
        }

        let ifd = series.first_ifd + plane_index;
        if ifd < output.next_ifd || output.staged.contains_key(&ifd) {
            return Err(plane_error("plane was already written".to_string()));
        }

        let samples = be_bytes_to_samples(bytes);

        if ifd > output.next_ifd {
            if let Some(limit) = self.config.max_staged_bytes {
                if output.staged_bytes + bytes.len() > limit {
                    return Err(plane_error(format!(
                        "staging limit of {} bytes reached with {} planes held",
                        limit,
                        output.staged.len()
                    )));
                }
            }
            debug!(ifd, next_ifd = output.next_ifd, "Staging out-of-order plane");
            output.stage(ifd, samples);
        } else {
            output
                .append(&series, ome_xml, &self.config.software, &samples)
                .map_err(|e| plane_error(e.to_string()))?;
            debug!(series = series_index, plane = plane_index, ifd, "Wrote plane");
        }

        output.drain_staged(&self.layout, ome_xml, &self.config.software);
        Ok(())
    }

    fn close_output(&mut self) -> Result<()> {
        let Some(mut output) = self.output.take() else {
            return Ok(());
        };
        let total = self.total_planes();
        let ome_xml = self.ome_xml.as_deref().unwrap_or_default();
        let mut missing: BTreeMap<usize, usize> = BTreeMap::new();

        while output.next_ifd < total {
            let ifd = output.next_ifd;
            let Some((series_index, series)) = series_for_ifd(&self.layout, ifd) else {
                break;
            };
            let samples = match output.unstage(ifd) {
                Some(samples) => samples,
                None => {
                    *missing.entry(series_index).or_default() += 1;
                    vec![0u16; series.plane_samples()]
                }
            };
            output
                .append(&series, ome_xml, &self.config.software, &samples)
                .map_err(|e| {
                    ExportError::ResourceRelease(format!(
                        "{}: failed to write plane {} of series {}: {}",
                        output.path.display(),
                        ifd - series.first_ifd,
                        series_index,
                        e
                    ))
                })?;
        }

        for (series, planes) in missing {
            warn!(series, planes, "Series incomplete at close, missing planes written as zeros");
        }

        let OpenOutput {
            sink,
            sync_handle,
            path,
            ..
        } = output;
        drop(sink);
        sync_handle
            .sync_all()
            .map_err(|e| ExportError::ResourceRelease(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), planes = total, "Closed OME-TIFF output");
        Ok(())
    }
}
