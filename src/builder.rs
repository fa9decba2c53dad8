//! Turns a raw newline-separated word list into the on-disk dictionary
//! pair: the concatenated word buffer and its pattern index.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Write};

use byteorder::{BigEndian, WriteBytesExt};
use itertools::Itertools;
use log::debug;

use crate::shape::shape_of_letters;

#[derive(Debug)]
pub enum BuildError {
    Io(io::Error),
    /// A word contains a byte outside `a..=z`.
    BadCharacter { line: usize, byte: u8 },
    /// A word longer than the index's length field can describe.
    WordTooLong { line: usize, len: usize },
}
impl From<io::Error> for BuildError {
    fn from(e: io::Error) -> Self {
        BuildError::Io(e)
    }
}
impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::Io(e) => write!(f, "{}", e),
            BuildError::BadCharacter { line, byte } => {
                write!(f, "line {}: byte {:#04x} is not a lowercase letter", line, byte)
            }
            BuildError::WordTooLong { line, len } => {
                write!(f, "line {}: word of {} letters exceeds the limit of 255", line, len)
            }
        }
    }
}
impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(e) => Some(e),
            _ => None,
        }
    }
}

struct Group {
    shape: Vec<u8>,
    words: Vec<u8>,
    count: u32,
}

/// Accumulates words grouped by shape, then serializes the group layout.
///
/// Groups appear in the output in the order their shapes were first seen,
/// and words keep their insertion order within a group; the reader only
/// relies on the order being stable.
#[derive(Default)]
pub struct IndexBuilder {
    groups: Vec<Group>,
    by_shape: HashMap<Vec<u8>, usize>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a word list, one word per line. Blank lines are skipped;
    /// trailing CR/LF is tolerated; anything else outside `a..=z` is fatal.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, BuildError> {
        let mut builder = IndexBuilder::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let word = line.trim_end().as_bytes();
            if word.is_empty() {
                continue;
            }
            builder.add_word_at(word, idx + 1)?;
        }
        debug!("indexed {} pattern groups", builder.groups.len());
        Ok(builder)
    }

    /// Files `word` under its shape's group, creating the group on first sight.
    pub fn add_word(&mut self, word: &[u8]) -> Result<(), BuildError> {
        self.add_word_at(word, 0)
    }

    fn add_word_at(&mut self, word: &[u8], line: usize) -> Result<(), BuildError> {
        if word.len() > u8::MAX as usize {
            return Err(BuildError::WordTooLong { line, len: word.len() });
        }
        let shape = shape_of_letters(word)
            .map_err(|e| BuildError::BadCharacter { line, byte: e.symbol })?;

        let idx = match self.by_shape.get(&shape) {
            Some(&idx) => idx,
            None => {
                self.groups.push(Group { shape: shape.clone(), words: Vec::new(), count: 0 });
                self.by_shape.insert(shape, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[idx];
        group.words.extend_from_slice(word);
        group.count += 1;
        Ok(())
    }

    /// Writes the word buffer and the big-endian pattern index.
    pub fn write_to<W: Write, X: Write>(&self, mut words_out: W, mut index_out: X) -> io::Result<()> {
        index_out.write_u32::<BigEndian>(self.groups.len() as u32)?;

        let mut offset = 0u32;
        for group in &self.groups {
            index_out.write_u8(group.shape.len() as u8)?;
            index_out.write_all(&group.shape)?;
            index_out.write_u32::<BigEndian>(offset)?;
            index_out.write_u32::<BigEndian>(group.count)?;
            words_out.write_all(&group.words)?;
            offset += group.words.len() as u32;
        }
        Ok(())
    }

    /// Human-readable listing of every group and its words, for the
    /// builder's test mode.
    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        for group in &self.groups {
            let len = group.shape.len();
            writeln!(out, "'{}' ({} words)", group.shape.iter().join(" "), group.count)?;
            for word in group.words.chunks_exact(len) {
                writeln!(out, "\t{}", String::from_utf8_lossy(word))?;
            }
        }
        Ok(())
    }
}
