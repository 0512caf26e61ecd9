//! Per-timepoint exposure times
//!
//! Exposure times are optional enrichment. A table of the wrong length is
//! dropped rather than rejected, so a model is always produced.

use tracing::debug;

/// Pairs each T index with its exposure time (seconds).
///
/// Returns `None` when no times were supplied or their count differs from
/// `timepoints`.
pub fn associate(timepoints: usize, exposure_times: Option<&[f64]>) -> Option<Vec<(usize, f64)>> {
    let exposure_times = exposure_times?;

    if exposure_times.len() != timepoints {
        debug!(
            supplied = exposure_times.len(),
            timepoints, "Ignoring exposure times: count does not match timepoints"
        );
        return None;
    }

    Some(exposure_times.iter().copied().enumerate().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_length_is_paired_in_t_order() {
        let table = associate(3, Some(&[0.1, 0.2, 0.4])).unwrap();
        assert_eq!(table, vec![(0, 0.1), (1, 0.2), (2, 0.4)]);
    }

    #[test]
    fn test_missing_or_mismatched_times_are_omitted() {
        assert!(associate(3, None).is_none());
        assert!(associate(3, Some(&[0.1, 0.2])).is_none());
        assert!(associate(1, Some(&[0.1, 0.2])).is_none());
        assert!(associate(2, Some(&[])).is_none());
    }
}
