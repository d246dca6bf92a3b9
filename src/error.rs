use std::fmt;

use thiserror::Error;

/// The part of the PNG framing a read was trying to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Signature,
    Length,
    Type,
    Data,
    Crc,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Signature => "signature",
            Field::Length => "chunk length",
            Field::Type => "chunk type",
            Field::Data => "chunk data",
            Field::Crc => "chunk CRC",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended inside a chunk rather than on a chunk boundary.
    #[error("input ended inside the {field}: expected {expected} bytes, read {read}")]
    TruncatedInput {
        field: Field,
        expected: u64,
        read: u64,
    },

    #[error("cannot encode {character:?} in {keyword:?} as Latin-1")]
    Encoding { keyword: String, character: char },

    #[error("chunk data of {0} bytes doesn't fit in a PNG length field")]
    ChunkTooLarge(usize),

    #[error("input doesn't start with the PNG signature")]
    NotPng,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
