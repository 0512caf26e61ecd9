use std::fmt;

/// Counters for one export session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Planes accepted by the encoder
    pub planes_written: usize,
    /// Plane writes rejected by the encoder
    pub planes_failed: usize,
    /// Successful series switches
    pub series_switches: usize,
    /// Series switches the encoder refused
    pub failed_series_switches: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} planes ({} failed) across {} series switches ({} failed)",
            self.planes_written,
            self.planes_failed,
            self.series_switches,
            self.failed_series_switches
        )
    }
}
