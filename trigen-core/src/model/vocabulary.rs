use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::trigram_model::UNKNOWN;

/// Set of words admitted into the model.
///
/// A word enters the vocabulary only if its total frequency across all
/// training sentences reaches the minimum threshold. The unknown symbol is
/// always a member, so a corpus where every word is rare still yields a
/// usable (all-unknown) model.
///
/// ## Invariants
/// - The unknown symbol is always present
/// - Membership only grows; words are never evicted
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Vocabulary {
	words: HashSet<String>,
}

impl Vocabulary {
	/// Creates a vocabulary containing only the unknown symbol.
	pub fn new() -> Self {
		let mut words = HashSet::new();
		words.insert(UNKNOWN.to_owned());
		Self { words }
	}

	/// Admits every word whose total frequency across `sentences` reaches
	/// `min_freq`.
	///
	/// Frequencies are counted globally over all sentences combined, not
	/// per sentence.
	pub fn admit_frequent(&mut self, sentences: &[Vec<String>], min_freq: u64) {
		let mut freq: HashMap<&str, u64> = HashMap::new();
		for sentence in sentences {
			for word in sentence {
				*freq.entry(word).or_insert(0) += 1;
			}
		}

		for (word, count) in freq {
			if count >= min_freq {
				self.words.insert(word.to_owned());
			}
		}
	}

	/// Returns true if `word` is in the vocabulary.
	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	/// Number of admitted words, unknown symbol included.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	/// Rewrites every out-of-vocabulary token to the unknown symbol.
	///
	/// The sentence shape is preserved; in-vocabulary tokens (including the
	/// unknown symbol itself) pass through unchanged.
	pub fn substitute(&self, sentences: Vec<Vec<String>>) -> Vec<Vec<String>> {
		sentences
			.into_iter()
			.map(|sentence| {
				sentence
					.into_iter()
					.map(|word| {
						if self.contains(&word) { word } else { UNKNOWN.to_owned() }
					})
					.collect()
			})
			.collect()
	}

	/// Adds every word of `other` to this vocabulary.
	pub fn absorb(&mut self, other: &Self) {
		self.words.extend(other.words.iter().cloned());
	}
}

impl Default for Vocabulary {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sentences(raw: &[&[&str]]) -> Vec<Vec<String>> {
		raw.iter()
			.map(|s| s.iter().map(|w| w.to_string()).collect())
			.collect()
	}

	#[test]
	fn always_contains_unknown() {
		let vocab = Vocabulary::new();
		assert!(vocab.contains(UNKNOWN));
		assert_eq!(vocab.len(), 1);
	}

	#[test]
	fn admits_on_global_frequency() {
		let mut vocab = Vocabulary::new();
		// "the" appears twice across sentences, "dog" only once
		vocab.admit_frequent(&sentences(&[&["the", "dog"], &["the"]]), 2);
		assert!(vocab.contains("the"));
		assert!(!vocab.contains("dog"));
	}

	#[test]
	fn below_threshold_corpus_collapses_to_unknown() {
		let mut vocab = Vocabulary::new();
		vocab.admit_frequent(&sentences(&[&["one", "of", "each"]]), 2);
		assert_eq!(vocab.len(), 1);

		let replaced = vocab.substitute(sentences(&[&["one", "of", "each"]]));
		assert_eq!(replaced, sentences(&[&[UNKNOWN, UNKNOWN, UNKNOWN]]));
	}

	#[test]
	fn substitution_preserves_shape() {
		let mut vocab = Vocabulary::new();
		vocab.admit_frequent(&sentences(&[&["a", "a", "b"]]), 2);

		let replaced = vocab.substitute(sentences(&[&["a", "b"], &["b"]]));
		assert_eq!(replaced, sentences(&[&["a", UNKNOWN], &[UNKNOWN]]));
	}
}
