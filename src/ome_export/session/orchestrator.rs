use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::ome_export::common::byte_order::samples_to_be_bytes;
use crate::ome_export::common::error::{ExportError, Result};
use crate::ome_export::container::{ContainerConfig, ContainerWriter, OmeTiffWriter};
use crate::ome_export::metadata::MetadataModel;
use crate::ome_export::session::stats::SessionStats;

/// Lifecycle of an export session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No output is open; writes are ignored
    Unopened,
    /// Output is open and accepts planes
    Ready,
    /// Output was released; writes are ignored
    Closed,
}

/// Owns one container writer and the output it produces.
///
/// Writes issued before a successful `open` or after `close` are silently
/// ignored so an acquisition loop never fails because export was unavailable.
/// Encoder failures on individual planes or series switches are returned per
/// call and leave the session usable.
pub struct ExportSession<W: ContainerWriter> {
    writer: W,
    output_path: PathBuf,
    state: SessionState,
    active_series: usize,
    model: Option<MetadataModel>,
    stats: SessionStats,
}

impl ExportSession<OmeTiffWriter> {
    pub fn new<P: AsRef<Path>>(output_path: P, config: ContainerConfig) -> Self {
        Self::with_custom(OmeTiffWriter::new(config), output_path)
    }
}

impl<W: ContainerWriter> ExportSession<W> {
    pub fn with_custom<P: AsRef<Path>>(writer: W, output_path: P) -> Self {
        Self {
            writer,
            output_path: output_path.as_ref().to_path_buf(),
            state: SessionState::Unopened,
            active_series: 0,
            model: None,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Series the encoder currently writes to, only meaningful while `Ready`
    pub fn active_series(&self) -> Option<usize> {
        (self.state == SessionState::Ready).then_some(self.active_series)
    }

    pub fn model(&self) -> Option<&MetadataModel> {
        self.model.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Binds `model` to the writer and opens the output file.
    ///
    /// Any file already at the output path is removed first. On failure the
    /// session stays `Unopened`.
    #[instrument(skip(self, model), fields(path = %self.output_path.display(), images = model.image_count()))]
    pub fn open(&mut self, model: MetadataModel) -> Result<()> {
        match self.state {
            SessionState::Unopened => {}
            SessionState::Ready => {
                return Err(ExportError::EncoderBinding(
                    "session is already open".to_string(),
                ));
            }
            SessionState::Closed => {
                return Err(ExportError::EncoderBinding(
                    "session is already closed".to_string(),
                ));
            }
        }

        self.remove_existing_output();

        self.writer.bind_metadata(&model)?;
        self.writer.open_output(&self.output_path)?;

        info!(planes = model.total_planes(), "Export session ready");
        self.model = Some(model);
        self.active_series = 0;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Writes one plane of raw big-endian uint16 bytes.
    ///
    /// Switches series first when `series` is not the active one. Planes within
    /// a series may arrive in any order.
    pub fn write_plane(&mut self, series: usize, plane: usize, bytes: &[u8]) -> Result<()> {
        if self.state != SessionState::Ready {
            debug!(series, plane, state = ?self.state, "Ignoring plane write outside an open session");
            return Ok(());
        }

        if series != self.active_series {
            if let Err(e) = self.writer.select_series(series) {
                self.stats.failed_series_switches += 1;
                warn!(series, plane, error = %e, "Series switch failed, plane dropped");
                return Err(e);
            }
            self.stats.series_switches += 1;
            self.active_series = series;
        }

        match self.writer.write_plane_bytes(plane, bytes) {
            Ok(()) => {
                self.stats.planes_written += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.planes_failed += 1;
                warn!(series, plane, error = %e, "Plane write failed");
                Err(e)
            }
        }
    }

    /// Writes one plane of uint16 samples, converted to big-endian bytes.
    pub fn write_samples(&mut self, series: usize, plane: usize, samples: &[u16]) -> Result<()> {
        if self.state != SessionState::Ready {
            return Ok(());
        }
        self.write_plane(series, plane, &samples_to_be_bytes(samples))
    }

    /// Releases the output. Safe to call repeatedly and before `open`.
    #[instrument(skip(self), fields(path = %self.output_path.display()))]
    pub fn close(&mut self) -> Result<()> {
        if self.state != SessionState::Ready {
            return Ok(());
        }

        self.state = SessionState::Closed;
        let result = self.writer.close_output();
        info!(stats = %self.stats, "Export session closed");
        result
    }

    fn remove_existing_output(&self) {
        if !self.output_path.exists() {
            return;
        }
        match std::fs::remove_file(&self.output_path) {
            Ok(()) => info!("Removed existing output file"),
            Err(e) => warn!(error = %e, "Failed to remove existing output file"),
        }
    }
}

impl<W: ContainerWriter> Drop for ExportSession<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to release output while dropping export session");
        }
    }
}
