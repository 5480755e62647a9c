//! Byte decoding for station exports
//!
//! Stations write the export as UTF-16LE. UTF-8 copies are accepted too,
//! either explicitly or by BOM sniffing.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IngestError, IngestResult};

const BOM: char = '\u{feff}';

/// Text encoding of a raw export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "auto")]
    Auto,
}

impl Encoding {
    /// Resolve `Auto` from the leading bytes
    pub fn detect(bytes: &[u8]) -> Encoding {
        match bytes {
            [0xFF, 0xFE, ..] => Encoding::Utf16Le,
            [0xEF, 0xBB, 0xBF, ..] => Encoding::Utf8,
            [_, 0x00, ..] if bytes.len() % 2 == 0 => Encoding::Utf16Le,
            _ => Encoding::Utf8,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf8 => "utf-8",
            Encoding::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for Encoding {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-16le" | "utf16le" | "utf-16" => Ok(Encoding::Utf16Le),
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "auto" => Ok(Encoding::Auto),
            other => Err(IngestError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Decode raw export bytes to text. A leading BOM is dropped.
pub fn decode_export(bytes: &[u8], encoding: Encoding) -> IngestResult<String> {
    let resolved = match encoding {
        Encoding::Auto => Encoding::detect(bytes),
        other => other,
    };

    let text = match resolved {
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map_err(|e| IngestError::Decode(format!("invalid UTF-8: {}", e)))?
            .to_string(),
        _ => decode_utf16le(bytes)?,
    };

    debug!(bytes = bytes.len(), encoding = %resolved, "decoded export");
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Unpaired surrogates become U+FFFD; an odd byte count cannot be UTF-16 at all
fn decode_utf16le(bytes: &[u8]) -> IngestResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(IngestError::Decode(format!(
            "odd byte length {} for UTF-16LE",
            bytes.len()
        )));
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// Read and decode an export file
pub fn load_export(path: &Path, encoding: Encoding) -> IngestResult<String> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), "read export file");
    decode_export(&bytes, encoding)
}
