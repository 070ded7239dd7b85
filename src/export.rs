//! Export - PNG and single-page PDF output with atomic writes
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! failed export never leaves a truncated card behind.
//!
//! The PDF is a minimal 1.4 document: one 2.5x3.5in page whose only content
//! is the card as a DCT (JPEG) image XObject scaled to the full page.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::print::PrintSpec;
use crate::render::RenderError;

const JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Output directory {path} is not usable: {reason}")]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error(transparent)]
    Dependency(#[from] RenderError),
}

/// Create `dir` if needed and confirm a file can be created inside it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    let invalid = |reason: String| ExportError::InvalidDirectory {
        path: dir.to_path_buf(),
        reason,
    };
    if dir.exists() && !dir.is_dir() {
        return Err(invalid("exists and is not a directory".into()));
    }
    fs::create_dir_all(dir).map_err(|e| invalid(e.to_string()))?;
    NamedTempFile::new_in(dir)
        .map(drop)
        .map_err(|e| invalid(format!("not writable: {}", e)))
}

/// Encode `image` in `format` and atomically write it to `path`.
pub fn export_image(
    image: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    print: &PrintSpec,
    document_id: &str,
) -> Result<(), ExportError> {
    let encoded = match format {
        ExportFormat::Png => encode_png(image),
        ExportFormat::Pdf => encode_pdf(image, print, document_id),
    };
    let bytes = encoded.map_err(|e| match e {
        ImageError::Unsupported(inner) => {
            ExportError::Dependency(RenderError::DependencyUnavailable(inner.to_string()))
        }
        other => ExportError::Encode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;
    write_atomic(path, &bytes)?;
    debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}

/// Single-page PDF at the physical card size. The image is resampled to
/// `print.pixel_size()` when needed and flattened onto white.
pub fn encode_pdf(image: &RgbaImage, print: &PrintSpec, document_id: &str) -> Result<Vec<u8>, ImageError> {
    let (width, height) = print.pixel_size();
    let resampled;
    let source = if image.dimensions() == (width, height) {
        image
    } else {
        resampled = imageops::resize(image, width, height, FilterType::Lanczos3);
        &resampled
    };
    let rgb = flatten_on_white(source);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).write_image(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;

    Ok(build_pdf(&jpeg, width, height, document_id))
}

fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let alpha = p[3] as u32;
        let channel = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([channel(p[0]), channel(p[1]), channel(p[2])])
    })
}

fn build_pdf(jpeg: &[u8], width: u32, height: u32, document_id: &str) -> Vec<u8> {
    let (page_w, page_h) = PrintSpec::page_size_points();
    let content = format!("q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im0 Do\nQ\n", page_w, page_h);

    let mut pdf: Vec<u8> = Vec::new();
    let mut offsets = Vec::with_capacity(5);
    pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut object = |pdf: &mut Vec<u8>, head: String, stream: Option<&[u8]>| {
        offsets.push(pdf.len());
        pdf.extend_from_slice(head.as_bytes());
        if let Some(data) = stream {
            pdf.extend_from_slice(b"stream\n");
            pdf.extend_from_slice(data);
            pdf.extend_from_slice(b"\nendstream\n");
        }
        pdf.extend_from_slice(b"endobj\n");
    };

    object(&mut pdf, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\n".into(), None);
    object(&mut pdf, "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\n".into(), None);
    object(
        &mut pdf,
        format!(
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /XObject << /Im0 5 0 R >> /ProcSet [/PDF /ImageC] >> /Contents 4 0 R >>\n",
            page_w, page_h
        ),
        None,
    );
    object(
        &mut pdf,
        format!("4 0 obj\n<< /Length {} >>\n", content.len()),
        Some(content.as_bytes()),
    );
    object(
        &mut pdf,
        format!(
            "5 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
             /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\n",
            width,
            height,
            jpeg.len()
        ),
        Some(jpeg),
    );

    let xref_offset = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
    for offset in &offsets {
        tail.push_str(&format!("{:010} 00000 n \n", offset));
    }
    tail.push_str(&format!("trailer\n<< /Size {} /Root 1 0 R", offsets.len() + 1));
    let id: String = document_id.chars().filter(char::is_ascii_hexdigit).take(32).collect();
    if !id.is_empty() {
        tail.push_str(&format!(" /ID [<{0}> <{0}>]", id));
    }
    tail.push_str(&format!(" >>\nstartxref\n{}\n%%EOF\n", xref_offset));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}

/// Write through a temp file in the destination directory, then rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
