use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use png_text_injector::{read_text, replace_text, TextEdits};

const USAGE: &str = "usage: png-text [-v] --list <input>
       png-text [-v] <input> <output> [--set KEY=VALUE]... [--remove KEY]...";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List(PathBuf),
    Edit {
        input: PathBuf,
        output: PathBuf,
        edits: TextEdits,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    verbosity: log::LevelFilter,
    command: Command,
}

impl Options {
    fn from_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut verbosity = log::LevelFilter::Error;
        let mut list = false;
        let mut paths = vec![];
        let mut edits = TextEdits::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" => verbosity = log::LevelFilter::Info,
                "--list" => list = true,
                "--set" => {
                    let pair = args.next().context("--set needs KEY=VALUE")?;
                    let Some((keyword, text)) = pair.split_once('=') else {
                        bail!("--set expects KEY=VALUE, got {pair:?}");
                    };
                    edits.set(keyword, text);
                }
                "--remove" => {
                    let keyword = args.next().context("--remove needs a keyword")?;
                    edits.remove(keyword);
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    bail!("unknown option {flag:?}\n{USAGE}")
                }
                _ => paths.push(PathBuf::from(&arg)),
            }
        }

        let command = match (list, paths.as_slice()) {
            (true, [input]) if edits.is_empty() => Command::List(input.clone()),
            (false, [input, output]) => Command::Edit {
                input: input.clone(),
                output: output.clone(),
                edits,
            },
            _ => bail!(USAGE),
        };
        Ok(Self { verbosity, command })
    }
}

fn main() -> anyhow::Result<()> {
    let options = Options::from_args(std::env::args().skip(1))?;
    pretty_env_logger::formatted_builder()
        .filter_level(options.verbosity)
        .parse_env("RUST_LOG")
        .init();

    match options.command {
        Command::List(input) => list(&input),
        Command::Edit {
            input,
            output,
            edits,
        } => edit(&input, &output, &edits),
    }
}

fn list(input: &Path) -> anyhow::Result<()> {
    let file =
        fs::File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let chunks = read_text(BufReader::new(file))
        .with_context(|| format!("Failed to read text chunks from {}", input.display()))?;
    let mut stdout = std::io::stdout().lock();
    for chunk in chunks {
        writeln!(stdout, "{}: {}", chunk.keyword, chunk.text)?;
    }
    Ok(())
}

/// Writes next to `output` first and renames on success, so a failed edit
/// never leaves a half-written PNG behind under the real name.
fn edit(input: &Path, output: &Path, edits: &TextEdits) -> anyhow::Result<()> {
    let partial = partial_path(output);
    let source =
        fs::File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let target = fs::File::create(&partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;

    let result = write_edited(BufReader::new(source), target, edits);
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e.context(format!("Failed to edit {}", input.display())));
    }
    if let Err(e) = fs::rename(&partial, output) {
        let _ = fs::remove_file(&partial);
        return Err(anyhow::Error::new(e).context(format!(
            "Failed to move {} to {}",
            partial.display(),
            output.display()
        )));
    }
    log::info!(
        "applied {} text edits from {} to {}",
        edits.len(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn write_edited(
    source: BufReader<fs::File>,
    target: fs::File,
    edits: &TextEdits,
) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(target);
    replace_text(source, &mut writer, edits)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}
