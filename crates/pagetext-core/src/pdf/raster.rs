//! Page rendering through poppler's `pdftoppm`.

use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use image::DynamicImage;
use tracing::{debug, trace};

use super::Rasterizer;
use crate::error::RasterError;

/// Rasterizer that shells out to `pdftoppm`, one call per page range.
///
/// The document is piped to the renderer's stdin; only rendered pages touch disk.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: String,
}

impl PdftoppmRasterizer {
    /// Use the given `pdftoppm` executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn render(
        &self,
        pdf: &[u8],
        pages: RangeInclusive<u32>,
        dpi: u32,
    ) -> Result<Vec<DynamicImage>, RasterError> {
        let (first, last) = (*pages.start(), *pages.end());
        let temp_dir = tempfile::tempdir()?;
        let output_prefix = temp_dir.path().join("page");

        debug!("Rendering pages {}-{} at {} DPI", first, last, dpi);

        let mut child = Command::new(&self.program)
            .args(["-png", "-r", &dpi.to_string()])
            .args(["-f", &first.to_string(), "-l", &last.to_string()])
            .arg("-")
            .arg(&output_prefix)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RasterError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A renderer that exits without reading reports why through its status.
            if let Err(e) = stdin.write_all(pdf) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(RasterError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // pdftoppm zero-pads page numbers to a common width, so name order is page order.
        let mut rendered: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                let is_page = path
                    .file_name()
                    .and_then(OsStr::to_str)
                    .is_some_and(|name| name.starts_with("page-"));
                is_page && path.extension() == Some(OsStr::new("png"))
            })
            .collect();
        rendered.sort();

        if rendered.is_empty() {
            return Err(RasterError::NoOutput { first, last });
        }

        let mut images = Vec::with_capacity(rendered.len());
        for path in &rendered {
            trace!("Loading rendered page {}", path.display());
            images.push(image::open(path)?);
        }

        Ok(images)
    }
}
