//! Modulo annotation for gated (lifetime) acquisitions
//!
//! The time axis of a gated stack does not measure elapsed time: each T index
//! is one gate delay. The annotation records those delays as ordered labels.

use crate::ome_export::common::error::{ExportError, Result};
use crate::ome_export::metadata::types::{ModuloAnnotation, ModuloAxis};

pub const MODULO_TYPE: &str = "lifetime";
pub const MODULO_UNIT: &str = "ps";
pub const MODULO_TYPE_DESCRIPTION: &str = "Gated";

/// Builds the modulo annotation for an image with `timepoints` planes.
///
/// Fails unless there is exactly one label per timepoint; label order is kept.
pub fn annotate(timepoints: usize, delay_labels: &[String]) -> Result<ModuloAnnotation> {
    if delay_labels.len() != timepoints {
        return Err(ExportError::ModuloLabelMismatch {
            labels: delay_labels.len(),
            timepoints,
        });
    }

    Ok(ModuloAnnotation {
        axis: ModuloAxis::T,
        modulo_type: MODULO_TYPE.to_string(),
        unit: MODULO_UNIT.to_string(),
        type_description: MODULO_TYPE_DESCRIPTION.to_string(),
        labels: delay_labels.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ome_export::common::error::ErrorKind;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_annotation_keeps_label_order() {
        let annotation = annotate(3, &labels(&["1000", "0", "500"])).unwrap();
        assert_eq!(annotation.axis, ModuloAxis::T);
        assert_eq!(annotation.unit, "ps");
        assert_eq!(annotation.type_description, "Gated");
        assert_eq!(annotation.modulo_type, "lifetime");
        assert_eq!(annotation.labels, labels(&["1000", "0", "500"]));
    }

    #[test]
    fn test_label_count_mismatch_is_rejected() {
        let err = annotate(3, &labels(&["0", "250"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            ExportError::ModuloLabelMismatch { labels: 2, timepoints: 3 }
        ));
    }

    #[test]
    fn test_empty_labels_for_nonempty_stack_are_rejected() {
        assert!(annotate(1, &[]).is_err());
    }
}
