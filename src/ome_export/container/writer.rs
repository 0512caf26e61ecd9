use std::path::Path;

use crate::ome_export::common::error::Result;
use crate::ome_export::metadata::MetadataModel;

/// An image-container encoder driven one plane at a time.
///
/// Implementations own the output resource between `open_output` and
/// `close_output`. Plane indices are relative to the selected series.
pub trait ContainerWriter {
    fn bind_metadata(&mut self, model: &MetadataModel) -> Result<()>;
    fn open_output(&mut self, path: &Path) -> Result<()>;
    fn select_series(&mut self, series: usize) -> Result<()>;
    fn write_plane_bytes(&mut self, plane_index: usize, bytes: &[u8]) -> Result<()>;
    fn close_output(&mut self) -> Result<()>;
}
