//! The in-memory dictionary: all words in one contiguous buffer, indexed by
//! repetition pattern.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::iter::{self, FusedIterator};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use log::debug;

/// File holding the concatenated dictionary words, no separators.
pub const WORDS_FILE: &str = "words";
/// File holding the big-endian pattern index over [`WORDS_FILE`].
pub const INDEX_FILE: &str = "patternIndex";

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    /// A group's word region falls outside the word buffer.
    BadRange { group: usize },
    /// A group declares zero-length words.
    EmptyPattern { group: usize },
}
impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}
impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "{}", e),
            LoadError::BadRange { group } => {
                write!(f, "pattern index entry {} points outside the words file", group)
            }
            LoadError::EmptyPattern { group } => {
                write!(f, "pattern index entry {} has zero length", group)
            }
        }
    }
}
impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// One group of the index: all dictionary words sharing a single shape
/// (and hence a single length), laid out back to back in the word buffer.
#[derive(Debug)]
pub struct PatternGroup {
    shape: Vec<u8>,
    start: usize,
    count: usize,
}

impl PatternGroup {
    pub fn word_len(&self) -> usize {
        self.shape.len()
    }
    pub fn shape(&self) -> &[u8] {
        &self.shape
    }
    pub fn word_count(&self) -> usize {
        self.count
    }
}

/// An immutable store of dictionary words grouped by shape.
pub struct Dictionary {
    words: Vec<u8>,
    groups: Vec<PatternGroup>,
}

impl Dictionary {
    /// Reads the `words`/`patternIndex` pair from `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        File::open(data_dir.join(WORDS_FILE))?.read_to_end(&mut words)?;
        let index = File::open(data_dir.join(INDEX_FILE))?;
        Self::from_parts(words, index)
    }

    /// Decodes a pattern index over an already loaded word buffer.
    pub fn from_parts<R: Read>(words: Vec<u8>, mut index: R) -> Result<Self, LoadError> {
        let num_groups = index.read_u32::<BigEndian>()? as usize;
        let mut groups = Vec::with_capacity(num_groups);
        for g in 0..num_groups {
            let len = index.read_u8()? as usize;
            if len == 0 {
                return Err(LoadError::EmptyPattern { group: g });
            }
            let mut shape = vec![0; len];
            index.read_exact(&mut shape)?;
            let start = index.read_u32::<BigEndian>()? as usize;
            let count = index.read_u32::<BigEndian>()? as usize;
            let end = count.checked_mul(len).and_then(|n| n.checked_add(start));
            match end {
                Some(end) if end <= words.len() => {}
                _ => return Err(LoadError::BadRange { group: g }),
            }
            groups.push(PatternGroup { shape, start, count });
        }

        debug!("loaded {} words in {} pattern groups", words.len(), groups.len());
        Ok(Dictionary { words, groups })
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Finds the unique group whose shape matches exactly, if any.
    /// The number of distinct shapes is modest, so a linear scan suffices.
    pub fn find_group(&self, shape: &[u8]) -> Option<&PatternGroup> {
        self.groups.iter().find(|g| g.shape == shape)
    }

    /// Streams the group's words that agree with `mask`: at every position
    /// where `mask` is non-zero, the word must carry that letter.
    pub fn matches<'a>(&'a self, group: &'a PatternGroup, mask: &'a [u8]) -> Matches<'a> {
        debug_assert_eq!(group.word_len(), mask.len());
        let end = group.start + group.count * group.word_len();
        Matches { words: &self.words[group.start..end], len: group.word_len(), mask }
    }
}

/// A single-pass cursor over the words of one pattern group, filtered by a
/// known-letter mask. Construct a new cursor to scan again.
pub struct Matches<'a> {
    words: &'a [u8],
    len: usize,
    mask: &'a [u8],
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a [u8];
    fn next(&mut self) -> Option<&'a [u8]> {
        while !self.words.is_empty() {
            let (word, rest) = self.words.split_at(self.len);
            self.words = rest;
            if iter::zip(self.mask, word).all(|(&m, &w)| m == 0 || m == w) {
                return Some(word);
            }
        }
        None
    }
}
impl FusedIterator for Matches<'_> {}
