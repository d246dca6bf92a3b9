use std::io::{Read, Write};

use log::{debug, trace};

use crate::{
    chunk::{parse_signature, write_chunk, ChunkReader, ChunkType},
    edits::TextEdits,
    error::{Error, Field, Result},
    text::{keyword_prefix, TextChunk},
};

/// Rewrites the `tEXt` chunks of the PNG in `input` into `output` without
/// touching image data.
///
/// Each keyword in `edits` loses every existing `tEXt` chunk. Keywords with a
/// value get one new chunk, written straight after `IHDR` in edit order. All
/// other chunks are copied byte for byte, CRCs included.
///
/// Edits are encoded before anything is written, so an [`Error::Encoding`]
/// leaves `output` untouched. Any other error leaves whatever was already
/// written in place.
pub fn replace_text<R: Read, W: Write>(input: R, mut output: W, edits: &TextEdits) -> Result<()> {
    let plan = EditPlan::new(edits)?;
    let mut reader = ChunkReader::new(input);

    output.write_all(&reader.read_signature()?)?;
    copy_ihdr(&mut reader, &mut output)?;

    for data in &plan.new_chunks {
        write_chunk(&mut output, ChunkType::TEXT, data)?;
    }
    debug!(
        "wrote {} text chunks, suppressing {} keywords",
        plan.new_chunks.len(),
        plan.removals.len()
    );

    let mut dropped = 0;
    while let Some(header) = reader.next_header()? {
        if header.chunk_type != ChunkType::TEXT {
            output.write_all(&header.to_bytes())?;
            reader.copy_rest(header.length, &mut output)?;
            continue;
        }

        let data = reader.read_data(header.length)?;
        if plan.removals.matches(&data) {
            trace!("dropping text chunk of {} bytes", header.length);
            reader.skip_crc()?;
            dropped += 1;
            continue;
        }
        output.write_all(&header.to_bytes())?;
        output.write_all(&data)?;
        output.write_all(&reader.read_crc()?)?;
    }
    debug!("dropped {dropped} existing text chunks");

    Ok(())
}

/// Lists every `tEXt` chunk in `input` in stream order.
pub fn read_text<R: Read>(input: R) -> Result<Vec<TextChunk>> {
    let mut reader = ChunkReader::new(input);
    let signature = reader.read_signature()?;
    parse_signature(&signature).map_err(|_| Error::NotPng)?;

    let mut chunks = vec![];
    while let Some(header) = reader.next_header()? {
        if header.chunk_type == ChunkType::TEXT {
            let data = reader.read_data(header.length)?;
            reader.skip_crc()?;
            chunks.push(TextChunk::from_bytes(&data));
        } else {
            reader.skip_rest(header.length)?;
        }
    }
    Ok(chunks)
}

/// The first chunk is `IHDR` by position; its type isn't checked.
fn copy_ihdr<R: Read, W: Write>(reader: &mut ChunkReader<R>, output: &mut W) -> Result<()> {
    let header = reader.next_header()?.ok_or(Error::TruncatedInput {
        field: Field::Length,
        expected: 4,
        read: 0,
    })?;
    if header.chunk_type != ChunkType::IHDR {
        debug!("first chunk is {}, copying it as the header anyway", header.chunk_type);
    }
    output.write_all(&header.to_bytes())?;
    reader.copy_rest(header.length, output)
}

/// Everything derived from the edits up front: the new chunk bodies and the
/// keyword prefixes whose old chunks get dropped.
struct EditPlan {
    new_chunks: Vec<Vec<u8>>,
    removals: RemovalSet,
}

impl EditPlan {
    fn new(edits: &TextEdits) -> Result<Self> {
        let mut new_chunks = vec![];
        let mut prefixes = vec![];
        for (keyword, text) in edits.iter() {
            if let Some(text) = text {
                new_chunks.push(TextChunk::new(keyword, text).to_bytes()?);
            }
            prefixes.push(keyword_prefix(keyword)?);
        }
        Ok(Self {
            new_chunks,
            removals: RemovalSet(prefixes),
        })
    }
}

/// `keyword\0` byte prefixes. Compared as raw bytes so Latin-1 keywords
/// match exactly as they were encoded.
struct RemovalSet(Vec<Vec<u8>>);

impl RemovalSet {
    fn matches(&self, chunk_data: &[u8]) -> bool {
        self.0.iter().any(|prefix| chunk_data.starts_with(prefix))
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}
