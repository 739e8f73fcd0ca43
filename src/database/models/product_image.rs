use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::timestamps;
use crate::database::DatabaseError;

/// Upper bound for stored image bytes unless configured otherwise.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Sniffs the image format from leading magic bytes. Used only for the
/// response `Content-Type`; stored bytes are never decoded.
pub fn detect_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF8") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if looks_like_svg(bytes) {
        return "image/svg+xml";
    }
    OCTET_STREAM
}

/// An XML prologue only counts as SVG when `<svg` shows up this early.
const SVG_SNIFF_BYTES: usize = 1024;

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_BYTES)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Binary image attached 1:1 to a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductImage {
    pub product_id: Uuid,
    #[serde(skip)]
    pub png_bytes: Vec<u8>,
    pub bytes_size: i64,
    content_type: &'static str,
    pub updated_at: DateTime<Utc>,
}

impl ProductImage {
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.png_bytes
    }
}

#[derive(Debug, FromRow)]
pub struct ProductImageRow {
    pub product_id: String,
    pub png_bytes: Vec<u8>,
    pub bytes_size: Option<i64>,
    pub updated_at: String,
}

impl TryFrom<ProductImageRow> for ProductImage {
    type Error = DatabaseError;

    fn try_from(row: ProductImageRow) -> Result<Self, Self::Error> {
        let product_id = Uuid::parse_str(&row.product_id)
            .map_err(|e| DatabaseError::Corrupt(format!("product_id '{}': {}", row.product_id, e)))?;

        let bytes_size = row.bytes_size.unwrap_or(row.png_bytes.len() as i64);
        if bytes_size <= 0 {
            return Err(DatabaseError::Corrupt(format!("image for {} is empty", product_id)));
        }

        Ok(ProductImage {
            product_id,
            content_type: detect_content_type(&row.png_bytes),
            png_bytes: row.png_bytes,
            bytes_size,
            updated_at: timestamps::parse("updated_at", &row.updated_at)?,
        })
    }
}
