use std::{
    fmt,
    io::{self, Read, Write},
};

use log::trace;
use nom::{bytes::complete::tag, IResult};

use crate::{
    crc::chunk_crc,
    error::{Error, Field, Result},
};

pub const SIGNATURE: [u8; 8] = *b"\x89PNG\x0d\x0a\x1a\x0a";

/// PNG lengths are capped at 2^31 - 1 even though the field is 32 bits wide.
pub const MAX_CHUNK_LENGTH: u32 = i32::MAX as u32;

const CRC_LENGTH: u64 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");
    pub const TEXT: Self = Self(*b"tEXt");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Chunk types are meant to be ASCII letters but nothing stops a file
        // from carrying anything else.
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub chunk_type: ChunkType,
}

impl ChunkHeader {
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0; 8];
        bytes[..4].copy_from_slice(&self.length.to_be_bytes());
        bytes[4..].copy_from_slice(self.chunk_type.as_bytes());
        bytes
    }
}

pub(crate) fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(SIGNATURE.as_slice())(input)
}

/// Sequential reader over PNG chunk framing.
///
/// Nothing is buffered beyond what a caller explicitly asks for: data and CRC
/// fields can be copied or skipped through [`io::copy`]'s fixed-size buffer.
pub struct ChunkReader<R> {
    inner: R,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the 8 signature bytes without checking them.
    pub fn read_signature(&mut self) -> Result<[u8; 8]> {
        self.read_field(Field::Signature)
    }

    /// Reads the next length and type, or `None` when the stream ends cleanly
    /// on a chunk boundary.
    pub fn next_header(&mut self) -> Result<Option<ChunkHeader>> {
        let mut length = [0; 4];
        let read = fill(&mut self.inner, &mut length)?;
        if read == 0 {
            return Ok(None);
        }
        if read < length.len() {
            return Err(truncated(Field::Length, length.len() as u64, read as u64));
        }
        let chunk_type = ChunkType(self.read_field(Field::Type)?);
        let header = ChunkHeader {
            length: u32::from_be_bytes(length),
            chunk_type,
        };
        trace!("chunk {} with {} data bytes", chunk_type, header.length);
        Ok(Some(header))
    }

    pub fn read_data(&mut self, length: u32) -> Result<Vec<u8>> {
        // Grows with what actually arrives, so a bogus length on a short
        // stream can't force a huge allocation up front.
        let mut data = Vec::new();
        let read = self
            .inner
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut data)?;
        if read < length as usize {
            return Err(truncated(Field::Data, length as u64, read as u64));
        }
        Ok(data)
    }

    pub fn read_crc(&mut self) -> Result<[u8; 4]> {
        self.read_field(Field::Crc)
    }

    pub fn skip_crc(&mut self) -> Result<()> {
        self.read_crc().map(|_| ())
    }

    /// Copies the `length` data bytes and the CRC that follow a header
    /// straight to `out`.
    pub fn copy_rest<W: Write + ?Sized>(&mut self, length: u32, out: &mut W) -> Result<()> {
        let expected = length as u64 + CRC_LENGTH;
        let copied = io::copy(&mut self.inner.by_ref().take(expected), out)?;
        check_span(length, copied)
    }

    pub fn skip_rest(&mut self, length: u32) -> Result<()> {
        self.copy_rest(length, &mut io::sink())
    }

    fn read_field<const N: usize>(&mut self, field: Field) -> Result<[u8; N]> {
        let mut bytes = [0; N];
        let read = fill(&mut self.inner, &mut bytes)?;
        if read < N {
            return Err(truncated(field, N as u64, read as u64));
        }
        Ok(bytes)
    }
}

/// Writes a complete chunk with a freshly computed CRC.
pub fn write_chunk<W: Write + ?Sized>(
    out: &mut W,
    chunk_type: ChunkType,
    data: &[u8],
) -> Result<()> {
    let length = chunk_length(data.len())?;
    let header = ChunkHeader { length, chunk_type };
    out.write_all(&header.to_bytes())?;
    out.write_all(data)?;
    out.write_all(&chunk_crc(chunk_type.as_bytes(), data).to_be_bytes())?;
    Ok(())
}

fn chunk_length(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&length| length <= MAX_CHUNK_LENGTH)
        .ok_or(Error::ChunkTooLarge(len))
}

/// Like `read_exact`, but reports how far it got instead of failing.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn check_span(length: u32, copied: u64) -> Result<()> {
    let length = length as u64;
    if copied < length {
        Err(truncated(Field::Data, length, copied))
    } else if copied < length + CRC_LENGTH {
        Err(truncated(Field::Crc, CRC_LENGTH, copied - length))
    } else {
        Ok(())
    }
}

fn truncated(field: Field, expected: u64, read: u64) -> Error {
    Error::TruncatedInput {
        field,
        expected,
        read,
    }
}
