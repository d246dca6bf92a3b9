//! Edit the `tEXt` metadata of a PNG without decoding or re-encoding its
//! image data.
//!
//! ```no_run
//! use png_text_injector::{replace_text, TextEdits};
//!
//! # fn main() -> png_text_injector::Result<()> {
//! let input = std::fs::File::open("in.png")?;
//! let output = std::io::BufWriter::new(std::fs::File::create("out.png")?);
//! let mut edits = TextEdits::new();
//! edits.set("Comment", "Test comment data.").remove("Software");
//! replace_text(std::io::BufReader::new(input), output, &edits)?;
//! # Ok(())
//! # }
//! ```

pub mod chunk;
mod crc;
mod edits;
mod error;
mod text;
mod transcoder;

pub use chunk::{write_chunk, ChunkHeader, ChunkReader, ChunkType, SIGNATURE};
pub use edits::TextEdits;
pub use error::{Error, Field, Result};
pub use text::{decode_latin1, encode_latin1, TextChunk};
pub use transcoder::{read_text, replace_text};
