use nom::{
    bytes::complete::{tag, take_until},
    sequence::terminated,
    IResult,
};

use crate::error::{Error, Result};

/// A decoded `tEXt` chunk: a keyword and its text, both Latin-1 on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub keyword: String,
    pub text: String,
}

impl TextChunk {
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
        }
    }

    /// Decodes a `tEXt` data field. Data without a NUL separator is taken to
    /// be all keyword.
    pub fn from_bytes(chunk_data: &[u8]) -> Self {
        let (keyword, text) = match split_keyword(chunk_data) {
            Ok((text, keyword)) => (keyword, text),
            Err(_) => (chunk_data, &chunk_data[chunk_data.len()..]),
        };
        Self {
            keyword: decode_latin1(keyword),
            text: decode_latin1(text),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = keyword_prefix(&self.keyword)?;
        data.extend(encode_latin1(&self.text).map_err(|character| Error::Encoding {
            keyword: self.keyword.clone(),
            character,
        })?);
        Ok(data)
    }
}

fn split_keyword(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_until(&b"\0"[..]), tag(&b"\0"[..]))(input)
}

/// `keyword` followed by the NUL separator, the byte prefix every `tEXt`
/// chunk for that keyword starts with.
pub(crate) fn keyword_prefix(keyword: &str) -> Result<Vec<u8>> {
    let mut prefix = encode_latin1(keyword).map_err(|character| Error::Encoding {
        keyword: keyword.to_owned(),
        character,
    })?;
    prefix.push(0);
    Ok(prefix)
}

/// Encodes `s` as ISO-8859-1, or returns the first character that has no
/// single-byte form.
pub fn encode_latin1(s: &str) -> std::result::Result<Vec<u8>, char> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| c))
        .collect()
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
