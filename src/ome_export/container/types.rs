//! OME-TIFF encoder configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, balanced level
    Deflate,
}

/// Configuration for the OME-TIFF container writer
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Compression method applied to every plane
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Value of the TIFF `Software` tag on the first IFD
    pub software: String,
    /// Upper bound on bytes held for out-of-order planes; `None` is unbounded
    pub max_staged_bytes: Option<usize>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
            software: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            max_staged_bytes: None,
        }
    }
}

impl ContainerConfig {
    pub fn builder() -> ContainerConfigBuilder {
        ContainerConfigBuilder::default()
    }
}

/// Builder for ContainerConfig
#[derive(Default)]
pub struct ContainerConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    software: Option<String>,
    max_staged_bytes: Option<Option<usize>>,
}

impl ContainerConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn software(mut self, software: impl Into<String>) -> Self {
        self.software = Some(software.into());
        self
    }

    pub fn max_staged_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_staged_bytes = Some(limit);
        self
    }

    pub fn build(self) -> ContainerConfig {
        let default = ContainerConfig::default();
        ContainerConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            software: self.software.unwrap_or(default.software),
            max_staged_bytes: self.max_staged_bytes.unwrap_or(default.max_staged_bytes),
        }
    }
}
