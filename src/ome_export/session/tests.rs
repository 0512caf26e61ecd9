use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::ome_export::common::error::{ErrorKind, ExportError, Result};
use crate::ome_export::container::ContainerWriter;
use crate::ome_export::metadata::{AcquisitionConfig, MetadataModel, MetadataModelBuilder, PlateLayout};
use crate::ome_export::session::{ExportSession, SessionState};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Bind(usize),
    Open,
    Series(usize),
    Plane(usize, usize),
    Close,
}

#[derive(Default)]
struct MockWriter {
    fail_bind: bool,
    fail_open: bool,
    fail_close: bool,
    fail_planes: bool,
    refused_series: HashSet<usize>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ContainerWriter for MockWriter {
    fn bind_metadata(&mut self, model: &MetadataModel) -> Result<()> {
        if self.fail_bind {
            return Err(ExportError::EncoderBinding("Mock unsupported pixel type".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Bind(model.image_count()));
        Ok(())
    }

    fn open_output(&mut self, _path: &Path) -> Result<()> {
        if self.fail_open {
            return Err(ExportError::EncoderBinding("Mock create error".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Open);
        Ok(())
    }

    fn select_series(&mut self, series: usize) -> Result<()> {
        if self.refused_series.contains(&series) {
            return Err(ExportError::SeriesSwitch {
                series,
                reason: "Mock refused series".to_string(),
            });
        }
        self.calls.lock().unwrap().push(Call::Series(series));
        Ok(())
    }

    fn write_plane_bytes(&mut self, plane_index: usize, bytes: &[u8]) -> Result<()> {
        if self.fail_planes {
            return Err(ExportError::PlaneWrite {
                series: 0,
                plane: plane_index,
                reason: "Mock encode error".to_string(),
            });
        }
        self.calls.lock().unwrap().push(Call::Plane(plane_index, bytes.len()));
        Ok(())
    }

    fn close_output(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Close);
        if self.fail_close {
            return Err(ExportError::ResourceRelease("Mock flush error".to_string()));
        }
        Ok(())
    }
}

fn stack_model(timepoints: usize) -> MetadataModel {
    let config = AcquisitionConfig::builder(256, 256).timepoints(timepoints).build();
    MetadataModelBuilder::build_single_image(&config).unwrap()
}

fn plate_model() -> MetadataModel {
    let layout = PlateLayout::new(vec![vec![1, 0], vec![2, 1]]);
    let config = AcquisitionConfig::builder(4, 4).timepoints(2).build();
    MetadataModelBuilder::build_plate(&layout, &config).unwrap()
}

fn session_with(writer: MockWriter) -> (ExportSession<MockWriter>, Arc<Mutex<Vec<Call>>>, tempfile::TempDir) {
    let calls = writer.calls.clone();
    let dir = tempfile::tempdir().unwrap();
    let session = ExportSession::with_custom(writer, dir.path().join("out.ome.tif"));
    (session, calls, dir)
}

#[test]
fn test_single_stack_planes_in_any_order() {
    let (mut session, calls, _dir) = session_with(MockWriter::default());
    session.open(stack_model(4)).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.active_series(), Some(0));

    let plane = vec![0u8; 256 * 256 * 2];
    for index in [2, 0, 3, 1] {
        session.write_plane(0, index, &plane).unwrap();
    }
    session.close().unwrap();

    assert_eq!(session.stats().planes_written, 4);
    assert_eq!(session.stats().series_switches, 0);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Bind(1),
            Call::Open,
            Call::Plane(2, 131072),
            Call::Plane(0, 131072),
            Call::Plane(3, 131072),
            Call::Plane(1, 131072),
            Call::Close,
        ]
    );
}

#[test]
fn test_series_switch_only_when_series_changes() {
    let (mut session, calls, _dir) = session_with(MockWriter::default());
    session.open(plate_model()).unwrap();

    let plane = vec![0u8; 32];
    session.write_plane(0, 0, &plane).unwrap();
    session.write_plane(0, 1, &plane).unwrap();
    session.write_plane(2, 0, &plane).unwrap();
    session.write_plane(2, 1, &plane).unwrap();
    session.write_plane(1, 0, &plane).unwrap();

    let switches: Vec<_> = calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            Call::Series(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(switches, vec![2, 1]);
    assert_eq!(session.active_series(), Some(1));
    assert_eq!(session.stats().series_switches, 2);
}

#[test]
fn test_failed_series_switch_is_recoverable() {
    let writer = MockWriter {
        refused_series: HashSet::from([3]),
        ..Default::default()
    };
    let (mut session, calls, _dir) = session_with(writer);
    session.open(plate_model()).unwrap();

    let plane = vec![0u8; 32];
    let err = session.write_plane(3, 0, &plane).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SeriesSwitch);
    assert!(err.is_recoverable());
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.active_series(), Some(0));
    assert!(!calls.lock().unwrap().contains(&Call::Plane(0, 32)));

    session.write_plane(1, 0, &plane).unwrap();
    assert_eq!(session.stats().failed_series_switches, 1);
    assert_eq!(session.stats().planes_written, 1);
}

#[test]
fn test_failed_plane_write_keeps_session_ready() {
    let writer = MockWriter {
        fail_planes: true,
        ..Default::default()
    };
    let (mut session, _calls, _dir) = session_with(writer);
    session.open(stack_model(2)).unwrap();

    let err = session.write_plane(0, 0, &[0u8; 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PlaneWrite);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.stats().planes_failed, 1);
}

#[test]
fn test_writes_before_open_are_ignored() {
    let (mut session, calls, _dir) = session_with(MockWriter::default());
    session.write_plane(0, 0, &[1, 2]).unwrap();
    session.write_samples(5, 9, &[1, 2, 3]).unwrap();
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(session.active_series(), None);
}

#[test]
fn test_rejected_model_leaves_session_unopened() {
    let writer = MockWriter {
        fail_bind: true,
        ..Default::default()
    };
    let (mut session, calls, _dir) = session_with(writer);

    let err = session.open(stack_model(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EncoderBinding);
    assert_eq!(session.state(), SessionState::Unopened);
    assert!(session.model().is_none());

    session.write_plane(0, 0, &[0u8; 2]).unwrap();
    session.close().unwrap();
    assert_eq!(session.state(), SessionState::Unopened);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_output_creation_failure_leaves_session_unopened() {
    let writer = MockWriter {
        fail_open: true,
        ..Default::default()
    };
    let (mut session, _calls, _dir) = session_with(writer);
    assert!(session.open(stack_model(1)).is_err());
    assert_eq!(session.state(), SessionState::Unopened);
}

#[test]
fn test_close_is_idempotent_and_ends_writes() {
    let (mut session, calls, _dir) = session_with(MockWriter::default());
    session.open(stack_model(1)).unwrap();
    session.close().unwrap();
    session.close().unwrap();
    session.write_plane(0, 0, &[0u8; 2]).unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.iter().filter(|c| **c == Call::Close).count(), 1);
    assert!(!calls.iter().any(|c| matches!(c, Call::Plane(..))));
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_release_failure_still_terminates_session() {
    let writer = MockWriter {
        fail_close: true,
        ..Default::default()
    };
    let (mut session, _calls, _dir) = session_with(writer);
    session.open(stack_model(1)).unwrap();

    let err = session.close().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceRelease);
    assert_eq!(session.state(), SessionState::Closed);
    session.close().unwrap();
}

#[test]
fn test_reopening_is_rejected() {
    let (mut session, _calls, _dir) = session_with(MockWriter::default());
    session.open(stack_model(1)).unwrap();
    assert_eq!(session.open(stack_model(1)).unwrap_err().kind(), ErrorKind::EncoderBinding);
    session.close().unwrap();
    assert_eq!(session.open(stack_model(1)).unwrap_err().kind(), ErrorKind::EncoderBinding);
}

#[test]
fn test_drop_closes_open_session() {
    let calls = {
        let (mut session, calls, _dir) = session_with(MockWriter::default());
        session.open(stack_model(1)).unwrap();
        calls
    };
    assert_eq!(calls.lock().unwrap().last(), Some(&Call::Close));
}

#[test]
fn test_samples_are_forwarded_as_big_endian_bytes() {
    let (mut session, calls, _dir) = session_with(MockWriter::default());
    session.open(stack_model(1)).unwrap();
    session.write_samples(0, 0, &[0x0102, 0x0304]).unwrap();
    assert!(calls.lock().unwrap().contains(&Call::Plane(0, 4)));
}

#[test]
fn test_existing_output_file_is_removed_on_open() {
    let (mut session, _calls, _dir) = session_with(MockWriter::default());
    std::fs::write(session.output_path(), b"stale").unwrap();
    session.open(stack_model(1)).unwrap();
    assert!(!session.output_path().exists());
}
