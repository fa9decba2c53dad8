//! The puzzle model: encoded words, the global code-number mapping, and
//! the puzzle-file parser.

use std::fmt;
use std::io::{self, BufRead};

use crate::letter_set::{LetterSet, ALPHABET_LEN};
use crate::shape::shape_of_codes;

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    /// A known-letter line that is not `<code> <letter>`.
    BadKnownLine { line: usize },
    /// A code number outside 1..=26.
    CodeOutOfRange { line: usize, value: i64 },
    /// A known-letter assignment outside `a..=z`.
    LetterOutOfRange { line: usize, token: String },
    /// A code-word token that is not a decimal integer.
    BadToken { line: usize, token: String },
    /// A blank line where a code word was expected.
    EmptyWordLine { line: usize },
}
impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "{}", e),
            ParseError::BadKnownLine { line } => {
                write!(f, "line {}: expected '<code number> <letter>'", line)
            }
            ParseError::CodeOutOfRange { line, value } => {
                write!(f, "line {}: code number {} out of range 1..=26", line, value)
            }
            ParseError::LetterOutOfRange { line, token } => {
                write!(f, "line {}: '{}' is not a lowercase letter", line, token)
            }
            ParseError::BadToken { line, token } => {
                write!(f, "line {}: '{}' is not a code number", line, token)
            }
            ParseError::EmptyWordLine { line } => {
                write!(f, "line {}: expected a code word", line)
            }
        }
    }
}
impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// One encoded word of the puzzle.
///
/// `cand` caches, per position, the letters appearing at that position
/// across all dictionary words compatible with the shape and the filled-in
/// positions; it is stale whenever `dirty` is set and is only rebuilt by
/// the solver.
pub struct CodeWord {
    pub(crate) clets: Vec<u8>,
    pub(crate) shape: Vec<u8>,
    pub(crate) known: Vec<u8>,
    pub(crate) cand: Vec<LetterSet>,
    pub(crate) dirty: bool,
}

impl CodeWord {
    /// Builds a code word from code numbers already validated into `1..=26`.
    pub(crate) fn new(clets: Vec<u8>) -> Self {
        let shape = shape_of_codes(&clets).expect("code numbers validated by the parser");
        let len = clets.len();
        CodeWord {
            clets,
            shape,
            known: vec![0; len],
            cand: vec![LetterSet::new(); len],
            dirty: true,
        }
    }

    /// The code numbers as they appear in the puzzle file, each 1..=26.
    pub fn codes(&self) -> &[u8] {
        &self.clets
    }
}

/// A parsed puzzle: the encoded words plus the decoding discovered so far.
pub struct Puzzle {
    pub(crate) words: Vec<CodeWord>,
    pub(crate) known: [u8; ALPHABET_LEN],
    pub(crate) needed: [bool; ALPHABET_LEN],
}

impl Puzzle {
    /// Parses a puzzle file.
    ///
    /// The file is two sections split by a blank line. Section 1 (possibly
    /// empty) assigns initially known letters, one `<code> <letter>` pair
    /// per line; when one code number is assigned more than once, the last
    /// assignment wins. Section 2 holds one code word per line as
    /// whitespace-separated numbers and runs to end of input; a further
    /// blank line there is malformed.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut known = [0; ALPHABET_LEN];
        let mut words = Vec::new();
        let mut in_known = true;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if in_known {
                if line.is_empty() {
                    in_known = false;
                } else {
                    parse_known_line(line, idx + 1, &mut known)?;
                }
            } else {
                words.push(parse_code_word(line, idx + 1)?);
            }
        }

        let mut needed = [false; ALPHABET_LEN];
        for cw in &words {
            for &clet in &cw.clets {
                needed[(clet - 1) as usize] = true;
            }
        }

        Ok(Puzzle { words, known, needed })
    }

    /// Global mapping: `known()[c]` is the letter for code number `c + 1`,
    /// or 0 while unassigned.
    pub fn known(&self) -> &[u8; ALPHABET_LEN] {
        &self.known
    }

    /// `needed()[c]` is true when code number `c + 1` appears in some word.
    pub fn needed(&self) -> &[bool; ALPHABET_LEN] {
        &self.needed
    }

    pub fn code_words(&self) -> &[CodeWord] {
        &self.words
    }

    /// Records a decoding for code number `code + 1` and invalidates the
    /// candidate cache of every word that uses it.
    pub(crate) fn set_known(&mut self, code: usize, letter: u8) {
        self.known[code] = letter;
        self.mark_dirty(code);
    }

    pub(crate) fn clear_known(&mut self, code: usize) {
        self.known[code] = 0;
        self.mark_dirty(code);
    }

    fn mark_dirty(&mut self, code: usize) {
        let clet = code as u8 + 1;
        for cw in &mut self.words {
            if cw.clets.contains(&clet) {
                cw.dirty = true;
            }
        }
    }
}

fn parse_known_line(
    line: &str,
    lineno: usize,
    known: &mut [u8; ALPHABET_LEN],
) -> Result<(), ParseError> {
    let mut parts = line.split_whitespace();
    let (code, letter) = match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(letter), None) => (code, letter),
        _ => return Err(ParseError::BadKnownLine { line: lineno }),
    };

    let code: i64 = code.parse().map_err(|_| ParseError::BadKnownLine { line: lineno })?;
    if !(1..=26).contains(&code) {
        return Err(ParseError::CodeOutOfRange { line: lineno, value: code });
    }
    let letter = match letter.as_bytes() {
        &[l @ b'a'..=b'z'] => l,
        _ => return Err(ParseError::LetterOutOfRange { line: lineno, token: letter.to_string() }),
    };

    known[(code - 1) as usize] = letter;
    Ok(())
}

fn parse_code_word(line: &str, lineno: usize) -> Result<CodeWord, ParseError> {
    let mut clets = Vec::new();
    for token in line.split_whitespace() {
        let value: i64 = token
            .parse()
            .map_err(|_| ParseError::BadToken { line: lineno, token: token.to_string() })?;
        if !(1..=26).contains(&value) {
            return Err(ParseError::CodeOutOfRange { line: lineno, value });
        }
        clets.push(value as u8);
    }
    if clets.is_empty() {
        return Err(ParseError::EmptyWordLine { line: lineno });
    }
    Ok(CodeWord::new(clets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Puzzle, ParseError> {
        Puzzle::parse(text.as_bytes())
    }

    #[test]
    fn parses_both_sections() {
        let puzzle = parse("3 c\n20 t\n\n3 1 20\n20 15 20\n").unwrap();
        assert_eq!(puzzle.known[2], b'c');
        assert_eq!(puzzle.known[19], b't');
        assert_eq!(puzzle.known.iter().filter(|&&k| k != 0).count(), 2);

        assert_eq!(puzzle.words.len(), 2);
        assert_eq!(puzzle.words[0].codes(), &[3, 1, 20]);
        assert_eq!(puzzle.words[0].shape, &[0, 0, 0]);
        assert_eq!(puzzle.words[1].codes(), &[20, 15, 20]);
        assert_eq!(puzzle.words[1].shape, &[1, 0, 1]);
        assert!(puzzle.words.iter().all(|cw| cw.dirty));
        assert!(puzzle.words.iter().all(|cw| cw.known.iter().all(|&k| k == 0)));
    }

    #[test]
    fn parses_empty_known_section() {
        let puzzle = parse("\n1 2 3\n").unwrap();
        assert!(puzzle.known.iter().all(|&k| k == 0));
        assert_eq!(puzzle.words.len(), 1);
    }

    #[test]
    fn last_assignment_wins() {
        let puzzle = parse("1 q\n1 x\n\n1 2\n").unwrap();
        assert_eq!(puzzle.known[0], b'x');
    }

    #[test]
    fn tolerates_crlf() {
        let puzzle = parse("4 d\r\n\r\n4 5\r\n5 4\r\n").unwrap();
        assert_eq!(puzzle.known[3], b'd');
        assert_eq!(puzzle.words.len(), 2);
    }

    #[test]
    fn rejects_blank_line_between_code_words() {
        assert!(matches!(
            parse("\n1 2\n\n3 4\n"),
            Err(ParseError::EmptyWordLine { line: 3 })
        ));
        // whitespace-only counts as blank too
        assert!(matches!(
            parse("\n1 2\n \n"),
            Err(ParseError::EmptyWordLine { line: 3 })
        ));
    }

    #[test]
    fn computes_needed() {
        let puzzle = parse("\n1 2 3\n3 5\n").unwrap();
        let needed: Vec<usize> =
            (0..ALPHABET_LEN).filter(|&c| puzzle.needed[c]).collect();
        assert_eq!(needed, &[0, 1, 2, 4]);
    }

    #[test]
    fn rejects_malformed_known_lines() {
        assert!(matches!(parse("1\n\n1 2\n"), Err(ParseError::BadKnownLine { line: 1 })));
        assert!(matches!(parse("1 a b\n\n1 2\n"), Err(ParseError::BadKnownLine { line: 1 })));
        assert!(matches!(parse("x a\n\n1 2\n"), Err(ParseError::BadKnownLine { line: 1 })));
    }

    #[test]
    fn rejects_out_of_range_known() {
        assert!(matches!(
            parse("27 a\n\n1 2\n"),
            Err(ParseError::CodeOutOfRange { line: 1, value: 27 })
        ));
        assert!(matches!(
            parse("0 a\n\n1 2\n"),
            Err(ParseError::CodeOutOfRange { line: 1, value: 0 })
        ));
        assert!(matches!(
            parse("1 A\n\n1 2\n"),
            Err(ParseError::LetterOutOfRange { line: 1, .. })
        ));
        assert!(matches!(
            parse("1 ab\n\n1 2\n"),
            Err(ParseError::LetterOutOfRange { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_bad_code_words() {
        assert!(matches!(parse("\n1 x 3\n"), Err(ParseError::BadToken { line: 2, .. })));
        assert!(matches!(
            parse("\n1 0 3\n"),
            Err(ParseError::CodeOutOfRange { line: 2, value: 0 })
        ));
        assert!(matches!(
            parse("\n1 99\n"),
            Err(ParseError::CodeOutOfRange { line: 2, value: 99 })
        ));
    }

    #[test]
    fn set_known_marks_users_dirty() {
        let mut puzzle = parse("\n1 2\n3 4\n2 3\n").unwrap();
        for cw in &mut puzzle.words {
            cw.dirty = false;
        }

        puzzle.set_known(1, b'e'); // code number 2
        assert_eq!(puzzle.known[1], b'e');
        assert!(puzzle.words[0].dirty);
        assert!(!puzzle.words[1].dirty);
        assert!(puzzle.words[2].dirty);

        for cw in &mut puzzle.words {
            cw.dirty = false;
        }
        puzzle.clear_known(1);
        assert_eq!(puzzle.known[1], 0);
        assert!(puzzle.words[0].dirty);
        assert!(!puzzle.words[1].dirty);
        assert!(puzzle.words[2].dirty);
    }
}
