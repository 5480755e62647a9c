//! Station export ingestion
//!
//! Decodes the raw bytes of a station export into text and parses the
//! semicolon-delimited rows into [`sitewx_core::Sample`]s. Malformed rows
//! are skipped and counted; only undecodable input is an error.

pub mod decode;
pub mod parser;

pub use decode::*;
pub use parser::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;
