//! The search: constraint propagation over per-code-number candidate sets,
//! forced-assignment commits, and backtracking over the most constrained
//! ambiguous code number.

use std::fmt;
use std::iter;

use itertools::Itertools;
use log::debug;

use crate::dictionary::Dictionary;
use crate::letter_set::{LetterSet, ALPHABET_LEN};
use crate::puzzle::{CodeWord, Puzzle};

#[derive(Debug)]
pub enum SolveError {
    /// The dictionary has no group for a code word's shape, so the puzzle
    /// cannot be decoded with this dictionary at all.
    MissingPattern { shape: Vec<u8> },
}
impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveError::MissingPattern { shape } => {
                write!(f, "dictionary has no pattern '{}'", shape.iter().join(" "))
            }
        }
    }
}
impl std::error::Error for SolveError {}

/// Search state over a borrowed dictionary and puzzle.
///
/// `possible[c]` is the set of letters still consistent with every code
/// word for code number `c + 1`; `used` is the set of letters already
/// assigned to some code number. Both are rebuilt at each recursion frame.
pub struct Solver<'a> {
    dict: &'a Dictionary,
    puzzle: &'a mut Puzzle,
    possible: [LetterSet; ALPHABET_LEN],
    used: LetterSet,
}

impl<'a> Solver<'a> {
    pub fn new(dict: &'a Dictionary, puzzle: &'a mut Puzzle) -> Self {
        Solver {
            dict,
            puzzle,
            possible: [LetterSet::new(); ALPHABET_LEN],
            used: LetterSet::new(),
        }
    }

    /// Runs the search to the first complete assignment.
    ///
    /// `Ok(true)` leaves the discovered mapping in the puzzle; `Ok(false)`
    /// means the search space is exhausted and the puzzle is left exactly
    /// as it was on entry. `Err` is a dictionary/puzzle mismatch and fatal.
    pub fn solve(&mut self) -> Result<bool, SolveError> {
        // a code number that never occurs needs no decoding
        let decoded = (0..ALPHABET_LEN)
            .filter(|&c| self.puzzle.known[c] != 0 || !self.puzzle.needed[c])
            .count();
        if decoded == ALPHABET_LEN {
            debug!("all required code numbers decoded");
            return Ok(true);
        }

        self.used.clear();
        for &k in self.puzzle.known.iter() {
            if k != 0 {
                self.used.insert(k - b'a');
            }
        }

        self.collate()?;

        // forced assignments, and the tightest code number to guess on
        let mut forced: Vec<(usize, u8)> = Vec::new();
        let mut forced_letters = LetterSet::new();
        let mut guess: Option<(usize, u32)> = None;
        for c in 0..ALPHABET_LEN {
            if self.puzzle.known[c] != 0 {
                continue;
            }
            let cands = self.possible[c];
            if cands.is_empty() {
                debug!("no letter left for code number {}", c + 1);
                return Ok(false);
            }
            if let Some(letter) = cands.sole() {
                // two code numbers forced to one letter is a contradiction
                if forced_letters.contains(letter) {
                    debug!("code number {} forced to an already forced letter", c + 1);
                    return Ok(false);
                }
                forced_letters.insert(letter);
                forced.push((c, letter + b'a'));
            } else if guess.map_or(true, |(_, n)| cands.len() < n) {
                guess = Some((c, cands.len()));
            }
        }

        if !forced.is_empty() {
            for &(c, letter) in &forced {
                debug!("forced {} -> {}", c + 1, letter as char);
                self.puzzle.set_known(c, letter);
            }
            let solved = self.solve()?;
            if !solved {
                for &(c, _) in &forced {
                    self.puzzle.clear_known(c);
                }
            }
            return Ok(solved);
        }

        let code = match guess {
            Some((code, _)) => code,
            None => return Ok(false),
        };

        // deeper frames overwrite `possible`, so guess from a local copy
        let cands = self.possible[code];
        for letter in cands {
            debug!("guessing {} -> {}", code + 1, (letter + b'a') as char);
            self.puzzle.set_known(code, letter + b'a');
            if self.solve()? {
                return Ok(true);
            }
            debug!("guess {} -> {} failed", code + 1, (letter + b'a') as char);
            self.puzzle.clear_known(code);
        }
        Ok(false)
    }

    /// Intersects every code word's evidence into `possible`, refreshing
    /// stale candidate caches on the way, then drops used letters.
    fn collate(&mut self) -> Result<(), SolveError> {
        for p in self.possible.iter_mut() {
            *p = LetterSet::full();
        }

        let Puzzle { words, known, .. } = &mut *self.puzzle;
        for cw in words.iter_mut() {
            if cw.dirty {
                refresh(cw, known, self.dict)?;
            }
            for (pos, &clet) in cw.clets.iter().enumerate() {
                self.possible[(clet - 1) as usize].intersect_with(&cw.cand[pos]);
            }
        }

        for p in self.possible.iter_mut() {
            p.subtract(&self.used);
        }
        Ok(())
    }
}

/// Rebuilds a code word's candidate cache against the current mapping.
fn refresh(cw: &mut CodeWord, known: &[u8; ALPHABET_LEN], dict: &Dictionary) -> Result<(), SolveError> {
    // rebuilt from scratch so no stale letter survives a backtracked frame
    for (pos, k) in cw.known.iter_mut().enumerate() {
        *k = known[(cw.clets[pos] - 1) as usize];
    }
    for cand in cw.cand.iter_mut() {
        cand.clear();
    }

    let group = dict
        .find_group(&cw.shape)
        .ok_or_else(|| SolveError::MissingPattern { shape: cw.shape.clone() })?;
    for word in dict.matches(group, &cw.known) {
        for (cand, &letter) in iter::zip(&mut cw.cand, word) {
            cand.insert(letter - b'a');
        }
    }

    cw.dirty = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;

    fn dict(words: &[&str]) -> Dictionary {
        let mut builder = IndexBuilder::new();
        for word in words {
            builder.add_word(word.as_bytes()).unwrap();
        }
        let mut buf = Vec::new();
        let mut index = Vec::new();
        builder.write_to(&mut buf, &mut index).unwrap();
        Dictionary::from_parts(buf, &index[..]).unwrap()
    }

    fn puzzle(text: &str) -> Puzzle {
        Puzzle::parse(text.as_bytes()).unwrap()
    }

    // every code word must decode to a dictionary word under the mapping
    fn assert_sound(puzzle: &Puzzle, dict: &Dictionary) {
        for cw in puzzle.code_words() {
            let decoded: Vec<u8> =
                cw.codes().iter().map(|&c| puzzle.known()[(c - 1) as usize]).collect();
            assert!(decoded.iter().all(|&l| l != 0));
            let shape = crate::shape::shape_of_letters(&decoded).unwrap();
            let group = dict.find_group(&shape).unwrap();
            let mask = vec![0; decoded.len()];
            assert!(dict.matches(group, &mask).any(|w| w == &decoded[..]));
        }
        let assigned: Vec<u8> =
            puzzle.known().iter().copied().filter(|&k| k != 0).collect();
        let mut distinct = assigned.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(assigned.len(), distinct.len());
    }

    #[test]
    fn solves_open_word_by_branching() {
        let dict = dict(&["cat", "cot", "dog", "dot"]);
        let mut puzzle = puzzle("\n1 2 3\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert_eq!(puzzle.known().iter().filter(|&&k| k != 0).count(), 3);
        assert_sound(&puzzle, &dict);
    }

    #[test]
    fn double_letter_shape_forces_solution() {
        let dict = dict(&["cat", "cot", "dog", "dot", "tot"]);
        let mut puzzle = puzzle("\n1 2 1\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert_eq!(puzzle.known()[0], b't');
        assert_eq!(puzzle.known()[1], b'o');
    }

    #[test]
    fn known_letter_narrows_candidates() {
        let dict = dict(&["cat", "cot", "dog", "dot", "tot"]);
        let mut puzzle = puzzle("1 c\n\n1 2 3\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert_eq!(puzzle.known()[0], b'c');
        assert_eq!(puzzle.known()[2], b't');
        assert!(puzzle.known()[1] == b'a' || puzzle.known()[1] == b'o');
        assert_sound(&puzzle, &dict);
    }

    #[test]
    fn repeated_pair_word_forces_single_letter() {
        let dict = dict(&["oo", "ox"]);
        let mut puzzle = puzzle("\n1 1\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());
        assert_eq!(puzzle.known()[0], b'o');
    }

    #[test]
    fn missing_shape_is_fatal() {
        let dict = dict(&["cat", "cot"]);
        let mut puzzle = puzzle("\n1 2 3 4 5\n");
        match Solver::new(&dict, &mut puzzle).solve() {
            Err(SolveError::MissingPattern { shape }) => assert_eq!(shape, &[0, 0, 0, 0, 0]),
            other => panic!("expected MissingPattern, got {:?}", other),
        }
    }

    #[test]
    fn filtered_out_known_reports_unsolved() {
        let dict = dict(&["cat", "cot", "dot"]);
        let mut puzzle = puzzle("1 q\n\n1 2 3\n");
        assert!(!Solver::new(&dict, &mut puzzle).solve().unwrap());
        // the initial assignment was not the solver's to undo
        assert_eq!(puzzle.known()[0], b'q');
    }

    #[test]
    fn backtracks_through_failed_guesses() {
        // pairing 1->a, 1->b, or 1->c dead-ends one of the two words;
        // only 1->d, 2->e satisfies both
        let dict = dict(&["ac", "ba", "cb", "de", "ed"]);
        let mut puzzle = puzzle("\n1 2\n2 1\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert_eq!(puzzle.known()[0], b'd');
        assert_eq!(puzzle.known()[1], b'e');
        assert_sound(&puzzle, &dict);
    }

    #[test]
    fn duplicate_forced_letters_contradict() {
        // the words force both 1 and 2 to 'b', which no injective mapping allows
        let dict = dict(&["ab", "bc"]);
        let mut puzzle = puzzle("\n1 2\n2 1\n");
        assert!(!Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert!(puzzle.known().iter().all(|&k| k == 0));
    }

    #[test]
    fn exhausted_search_restores_entry_state() {
        // the double-letter word forces 1->t and 2->o; the second word must
        // then decode to "to", whose 'o' is already taken
        let dict = dict(&["tot", "to", "xa"]);
        let mut puzzle = puzzle("\n1 2 1\n1 3\n");
        assert!(!Solver::new(&dict, &mut puzzle).solve().unwrap());

        assert!(puzzle.known().iter().all(|&k| k == 0));
    }

    #[test]
    fn collate_clears_dirty_and_fills_candidates() {
        let dict = dict(&["cat", "cot", "dog", "dot"]);
        let mut puzzle = puzzle("\n1 2 3\n");
        let mut solver = Solver::new(&dict, &mut puzzle);
        solver.collate().unwrap();

        assert!(solver.puzzle.words.iter().all(|cw| !cw.dirty));
        let first = &solver.puzzle.words[0];
        assert_eq!(format!("{:?}", first.cand[0]), "{cd}");
        assert_eq!(format!("{:?}", first.cand[1]), "{ao}");
        assert_eq!(format!("{:?}", first.cand[2]), "{gt}");
        assert_eq!(format!("{:?}", solver.possible[0]), "{cd}");
    }

    #[test]
    fn trivial_puzzle_is_already_solved() {
        let dict = dict(&["cat"]);
        let mut puzzle = puzzle("\n");
        assert!(Solver::new(&dict, &mut puzzle).solve().unwrap());
        assert!(puzzle.known().iter().all(|&k| k == 0));
    }
}
