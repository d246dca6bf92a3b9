use std::{
    fs,
    time::{Duration, Instant},
};

use anyhow::Context;
use miniz_oxide::{deflate::compress_to_vec_zlib, inflate::decompress_to_vec_zlib};
use png_text_injector::{replace_text, write_chunk, ChunkReader, ChunkType, TextEdits};

const ITERATIONS: u32 = 32;
const COMMENT: (&str, &str) = ("Comment", "Test comment data.");

fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().skip(1).collect();
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity(&args))
        .init();
    let mut args = args.iter().filter(|arg| *arg != "-v");
    let input_path = args
        .next()
        .context("usage: text-bench [-v] <input.png> [iterations]")?;
    let iterations = match args.next() {
        Some(n) => n.parse().context("iterations must be a number")?,
        None => ITERATIONS,
    };

    let input = fs::read(input_path).with_context(|| format!("Failed to read {input_path}"))?;
    let mut edits = TextEdits::new();
    edits.set(COMMENT.0, COMMENT.1);

    let streaming = time_iterations(iterations, || {
        let mut out = Vec::with_capacity(input.len());
        replace_text(input.as_slice(), &mut out, &edits)?;
        Ok(out.len())
    })
    .context("Streaming text replacement failed")?;
    log::info!("streaming edit: {streaming:?} for {iterations} iterations");

    let reencoded = time_iterations(iterations, || reencode_with_comment(&input))
        .context("Re-encoding failed")?;
    log::info!("re-encode: {reencoded:?} for {iterations} iterations");

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let results = serde_json::json!({
        "date": now,
        "input": input_path,
        "input_bytes": input.len(),
        "iterations": iterations,
        "streaming_seconds": streaming.as_secs_f64(),
        "reencode_seconds": reencoded.as_secs_f64(),
    });
    println!("{results}");
    Ok(())
}

/// `-v` anywhere on the command line turns on info logging.
fn verbosity(args: &[String]) -> log::LevelFilter {
    if args.iter().any(|arg| arg == "-v") {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Error
    }
}

/// Runs `f` `iterations` times, returning the total wall time.
fn time_iterations<F>(iterations: u32, mut f: F) -> anyhow::Result<Duration>
where
    F: FnMut() -> anyhow::Result<usize>,
{
    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(f()?);
    }
    Ok(start.elapsed())
}

/// What a general purpose image library does to add a comment: inflate the
/// image data, deflate it again and write every chunk back out.
fn reencode_with_comment(input: &[u8]) -> anyhow::Result<usize> {
    let mut reader = ChunkReader::new(input);
    let mut out = reader.read_signature()?.to_vec();
    let mut compressed = vec![];
    let mut tail = vec![];

    while let Some(header) = reader.next_header()? {
        let data = reader.read_data(header.length)?;
        reader.skip_crc()?;
        match header.chunk_type {
            ChunkType::IDAT => compressed.extend(data),
            ChunkType::IEND => {}
            ChunkType::TEXT if data.starts_with(b"Comment\0") => {}
            chunk_type if compressed.is_empty() => {
                write_chunk(&mut out, chunk_type, &data)?;
                if chunk_type == ChunkType::IHDR {
                    let mut comment = COMMENT.0.as_bytes().to_vec();
                    comment.push(0);
                    comment.extend(COMMENT.1.as_bytes());
                    write_chunk(&mut out, ChunkType::TEXT, &comment)?;
                }
            }
            chunk_type => tail.push((chunk_type, data)),
        }
    }

    let raw = decompress_to_vec_zlib(&compressed).context("Failed to decompress image data.")?;
    write_chunk(&mut out, ChunkType::IDAT, &compress_to_vec_zlib(&raw, 6))?;
    for (chunk_type, data) in tail {
        write_chunk(&mut out, chunk_type, &data)?;
    }
    write_chunk(&mut out, ChunkType::IEND, &[])?;
    Ok(out.len())
}
