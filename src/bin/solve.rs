use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use itertools::Itertools;

use codeword_solver::{Dictionary, Puzzle, Solver};

/// Solve a codeword puzzle against the prebuilt dictionary
#[derive(Parser)]
struct Args {
    /// Location of the puzzle file
    puzzle_file: PathBuf,

    /// Directory holding the dictionary's `words` and `patternIndex` files
    #[clap(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Also print which code numbers the puzzle uses, each decoded code
    /// word, and the search trace
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn })
        .init();

    let dict = match Dictionary::open(&args.data_dir) {
        Ok(dict) => dict,
        Err(e) => {
            eprintln!("failed to load dictionary from '{}': {}", args.data_dir.display(), e);
            process::exit(1);
        }
    };

    let file = match File::open(&args.puzzle_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("failed to open '{}': {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };
    let mut puzzle = match Puzzle::parse(BufReader::new(file)) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("failed to parse '{}': {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };

    if args.verbose {
        let (needed, unneeded): (Vec<_>, Vec<_>) =
            (1..=puzzle.needed().len()).partition(|&n| puzzle.needed()[n - 1]);
        println!("code numbers needed = {}", needed.iter().join(" "));
        println!(" (hence not needed) = {}", unneeded.iter().join(" "));
    }

    let solved = match Solver::new(&dict, &mut puzzle).solve() {
        Ok(solved) => solved,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    println!("{}", if solved { "Puzzle Solved" } else { "Puzzle Not Solved" });
    println!("Mapping:");
    for (i, &k) in puzzle.known().iter().enumerate() {
        match k {
            0 => println!("    {} -> ?", i + 1),
            k => println!("    {} -> {}", i + 1, k as char),
        }
    }

    if args.verbose {
        println!("Decoded Words:");
        for cw in puzzle.code_words() {
            let decoded: String = cw
                .codes()
                .iter()
                .map(|&c| match puzzle.known()[(c - 1) as usize] {
                    0 => '?',
                    k => k as char,
                })
                .collect();
            println!("    {}", decoded);
        }
    }
}
