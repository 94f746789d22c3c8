//! Command-line interface for kinsoku-split
//!
//! Usage:
//!   kinsoku [OPTIONS] <TEXT>
//!   echo "「こんにちは」と言った。" | kinsoku
//!
//! Options:
//!   -l, --lang <TAG>       Language tag of the text
//!   -c, --concat-char      Consolidate characters instead of words
//!   -w, --word-segmenter   Use dictionary word boundaries
//!   -n, --no-rules         Skip line-breaking consolidation
//!       --config <FILE>    Read options from a JSON file
//!   -j, --json             Output as JSON
//!   -h, --help             Show help

use kinsoku_split::{Split, SplitError, SplitOptions, Splitter};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use thiserror::Error;

const HELP: &str = r#"kinsoku - split text into word and character tokens

USAGE:
    kinsoku [OPTIONS] [TEXT]
    echo "「こんにちは」と言った。" | kinsoku

OPTIONS:
    -l, --lang <TAG>       Language tag of the text (default: en)
    -c, --concat-char      Consolidate characters instead of words
    -w, --word-segmenter   Use dictionary word boundaries
    -n, --no-rules         Skip line-breaking consolidation
        --config <FILE>    Read options from a JSON file
    -j, --json             Output as JSON
    -h, --help             Show this help message

EXAMPLES:
    kinsoku "contact user@example.com now"
    kinsoku -l ja -w "今日は良い天気です。"
    kinsoku --config options.json -j "「こんにちは」"
    RUST_LOG=debug kinsoku -c "——と言った"
"#;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("unknown option '{0}', try --help")]
    UnknownOption(String),
    #[error("no input text")]
    NoInput,
    #[error("config file '{path}': {source}")]
    Config { path: String, source: SplitError },
    #[error("config file '{path}': {source}")]
    ConfigRead { path: String, source: io::Error },
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parsed command line. Flags override the config file.
#[derive(Debug, Default, PartialEq)]
struct Cli {
    lang: Option<String>,
    concat_char: bool,
    word_segmenter: bool,
    no_rules: bool,
    json: bool,
    config: Option<String>,
    text: Option<String>,
}

impl Cli {
    /// Parse arguments after the program name. `None` means help was asked for.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Cli>, CliError> {
        let mut cli = Cli::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "-c" | "--concat-char" => cli.concat_char = true,
                "-w" | "--word-segmenter" => cli.word_segmenter = true,
                "-n" | "--no-rules" => cli.no_rules = true,
                "-j" | "--json" => cli.json = true,
                "-l" | "--lang" => {
                    cli.lang = Some(args.next().ok_or(CliError::MissingValue("--lang"))?);
                }
                "--config" => {
                    cli.config = Some(args.next().ok_or(CliError::MissingValue("--config"))?);
                }
                _ if arg.starts_with('-') => return Err(CliError::UnknownOption(arg)),
                _ => cli.text = Some(arg),
            }
        }

        Ok(Some(cli))
    }

    fn options(&self) -> Result<SplitOptions, CliError> {
        let mut options = match &self.config {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
                SplitOptions::from_json(&content).map_err(|source| CliError::Config {
                    path: path.clone(),
                    source,
                })?
            }
            None => SplitOptions::default(),
        };

        if let Some(lang) = &self.lang {
            options.default_lang = Some(lang.clone());
        }
        options.concat_char |= self.concat_char;
        options.word_segmenter |= self.word_segmenter;
        options.line_breaking_rules &= !self.no_rules;
        Ok(options)
    }

    /// Text from the command line, else stdin with line breaks turned into spaces
    fn input(&self) -> Result<String, CliError> {
        let text = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut raw = String::new();
                io::stdin().lock().read_to_string(&mut raw)?;
                raw.lines().collect::<Vec<_>>().join(" ")
            }
        };

        if text.is_empty() {
            return Err(CliError::NoInput);
        }
        Ok(text)
    }
}

fn write_plain(split: &Split, out: &mut impl Write) -> io::Result<()> {
    for word in split.words.iter().filter(|w| !w.is_whitespace()) {
        let chars: Vec<&str> = split.chars_of(word.index).map(|c| c.text()).collect();
        writeln!(out, "{}\t{}\t{}", word.index, word.text(), chars.join("|"))?;
    }
    writeln!(out, "words: {}\tchars: {}", split.word_count(), split.char_count())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let splitter = Splitter::new(cli.options()?);
    let split = splitter.split_text(&cli.input()?)?;

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &split)?;
        writeln!(out)?;
    } else {
        write_plain(&split, &mut out)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::parse(env::args().skip(1)) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            eprint!("{}", HELP);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("kinsoku: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kinsoku: {}", e);
            ExitCode::FAILURE
        }
    }
}
