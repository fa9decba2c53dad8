//! Solver for codeword puzzles: every letter `a..=z` has been replaced by
//! a distinct number in `1..=26`, and the substitution must be recovered
//! from the encoded words, a handful of given letters, and a dictionary of
//! allowed words.
//!
//! The dictionary lives on disk as a pair of files built ahead of time by
//! [`IndexBuilder`]: one raw buffer of concatenated words and one index
//! grouping them by repetition pattern, so that all candidate decodings of
//! an encoded word can be streamed without scanning the whole word list.
//! [`Solver`] then tightens a per-code-number candidate letter set with
//! evidence from every encoded word, commits forced assignments, and
//! backtracks over the most constrained code number when nothing is forced.

mod builder;
mod dictionary;
mod letter_set;
mod puzzle;
mod shape;
mod solver;

pub use builder::{BuildError, IndexBuilder};
pub use dictionary::{Dictionary, LoadError, Matches, PatternGroup, INDEX_FILE, WORDS_FILE};
pub use letter_set::{LetterSet, ALPHABET_LEN};
pub use puzzle::{CodeWord, ParseError, Puzzle};
pub use shape::{shape_of_codes, shape_of_letters, ShapeError};
pub use solver::{SolveError, Solver};
