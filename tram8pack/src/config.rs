//! Options for a single packaging run.

use crate::geometry::BOOTLOADER_START;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Directory receiving both artifacts; the input's directory when `None`
    pub output_dir: Option<PathBuf>,
    /// First address of the reserved bootloader region
    pub boundary: usize,
    /// Append one blank page after the firmware when it still fits below `boundary`
    pub spare_page: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            boundary: BOOTLOADER_START,
            spare_page: false,
        }
    }
}

impl PackOptions {
    #[must_use]
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_boundary(mut self, boundary: usize) -> Self {
        self.boundary = boundary;
        self
    }

    #[must_use]
    pub fn with_spare_page(mut self, spare_page: bool) -> Self {
        self.spare_page = spare_page;
        self
    }

    /// Paths of the linear hex file and the SysEx file produced for `hex_path`:
    /// `<stem>_linear.hex` and `<stem>_firmware.syx`.
    ///
    /// # Example
    /// ```
    /// use std::path::Path;
    /// use tram8pack::PackOptions;
    ///
    /// let (linear, sysex) = PackOptions::default().output_paths(Path::new("fw/tram8.hex"));
    /// assert_eq!(linear, Path::new("fw/tram8_linear.hex"));
    /// assert_eq!(sysex, Path::new("fw/tram8_firmware.syx"));
    /// ```
    #[must_use]
    pub fn output_paths(&self, hex_path: &Path) -> (PathBuf, PathBuf) {
        let dir = self
            .output_dir
            .clone()
            .or_else(|| hex_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let stem = hex_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        (
            dir.join(format!("{stem}_linear.hex")),
            dir.join(format!("{stem}_firmware.syx")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PackOptions::default();
        assert_eq!(options.boundary, 0x1C00);
        assert!(!options.spare_page);
        assert!(options.output_dir.is_none());
    }

    #[test]
    fn test_output_paths_with_output_dir() {
        // Arrange
        let options = PackOptions::default().with_output_dir("out/syx");

        // Act
        let (linear, sysex) = options.output_paths(Path::new("fw/Tram8.HEX"));

        // Assert
        assert_eq!(linear, Path::new("out/syx/Tram8_linear.hex"));
        assert_eq!(sysex, Path::new("out/syx/Tram8_firmware.syx"));
    }

    #[test]
    fn test_output_paths_bare_file_name() {
        let (linear, _) = PackOptions::default().output_paths(Path::new("tram8.hex"));
        assert_eq!(linear, Path::new("tram8_linear.hex"));
    }
}
