use image::{GrayImage, ImageFormat};
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::engine::OcrEngine;
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Default install location of the official Windows installer
pub const WINDOWS_DEFAULT_PATH: &str = r"C:\Program Files\Tesseract-OCR\tesseract.exe";

/// Tesseract OCR engine driving the `tesseract` executable.
///
/// The image is piped in as PNG on stdin and the recognized text is read
/// from stdout, so no temporary files are involved.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    page_seg_mode: u8,
}

impl TesseractEngine {
    /// Locate tesseract and create an engine for it
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let binary = Self::locate(config.tesseract_path.as_deref())?;
        tracing::info!(path = %binary.display(), lang = %config.language, "Using tesseract");

        Ok(Self {
            binary,
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
        })
    }

    /// Find the tesseract executable.
    ///
    /// Order: explicit path, PATH, then the Windows default install location.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, OcrError> {
        let mut searched = Vec::new();

        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            tracing::warn!(path = %path.display(), "Configured tesseract path does not exist");
            searched.push(path.display().to_string());
        }

        if let Some(found) = find_on_path(executable_name()) {
            return Ok(found);
        }
        searched.push("PATH".to_string());

        let windows_default = Path::new(WINDOWS_DEFAULT_PATH);
        if windows_default.is_file() {
            return Ok(windows_default.to_path_buf());
        }
        searched.push(WINDOWS_DEFAULT_PATH.to_string());

        Err(OcrError::Unavailable {
            searched: searched.join(", "),
        })
    }

    /// Check if tesseract can be found without any configuration
    pub fn is_available() -> bool {
        Self::locate(None).is_ok()
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn encode_png(image: &GrayImage) -> Result<Vec<u8>, OcrError> {
        let mut png: Vec<u8> = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let png = Self::encode_png(image)?;

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Tesseract reads the whole image before writing anything, so writing
        // first and then collecting output cannot deadlock. Dropping stdin closes it.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&png) {
                Ok(()) => {}
                // Exited without reading the image (bad language, missing traineddata);
                // the reason is on stderr.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("tesseract closed stdin before reading the image");
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrError::Recognition(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(chars = text.len(), "Tesseract finished");
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "tesseract.exe"
    } else {
        "tesseract"
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
