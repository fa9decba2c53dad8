use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use codeword_solver::{IndexBuilder, INDEX_FILE, WORDS_FILE};

/// Build the on-disk dictionary from a newline-separated word list
#[derive(Parser)]
struct Args {
    /// Location of the raw word list, one lowercase word per line
    wordlist_file: PathBuf,

    /// Pass `test` to print a readable listing to stdout instead of
    /// writing the data files
    mode: Option<String>,

    /// Directory to write the `words` and `patternIndex` files into
    #[clap(short, long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() {
    let args = Args::parse();
    env_logger::init();

    let test_mode = match args.mode.as_deref() {
        None => false,
        Some("test") => true,
        Some(other) => {
            eprintln!("unrecognised argument '{}' (expected 'test')", other);
            process::exit(1);
        }
    };

    let file = match File::open(&args.wordlist_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("failed to open '{}': {}", args.wordlist_file.display(), e);
            process::exit(1);
        }
    };
    let builder = match IndexBuilder::read_from(BufReader::new(file)) {
        Ok(builder) => builder,
        Err(e) => {
            eprintln!("failed to read '{}': {}", args.wordlist_file.display(), e);
            process::exit(1);
        }
    };

    let result = if test_mode {
        builder.dump(io::stdout().lock())
    } else {
        write_data_files(&builder, &args.data_dir)
    };
    if let Err(e) = result {
        eprintln!("failed to write dictionary: {}", e);
        process::exit(1);
    }
}

fn write_data_files(builder: &IndexBuilder, data_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let words = BufWriter::new(File::create(data_dir.join(WORDS_FILE))?);
    let index = BufWriter::new(File::create(data_dir.join(INDEX_FILE))?);
    builder.write_to(words, index)
}
