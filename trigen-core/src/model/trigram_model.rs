use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use serde::{Deserialize, Serialize};

use crate::io::{build_output_path, get_filename, read_file};
use super::context_state::ContextState;
use super::normalizer;
use super::vocabulary::Vocabulary;

/// Start-of-sequence symbol, used twice as padding for every sentence.
pub const START: &str = "<s>";
/// End-of-sequence symbol, terminates generation and is never emitted.
pub const END: &str = "</s>";
/// Unknown-word symbol, absorbs out-of-vocabulary tokens.
pub const UNKNOWN: &str = "<UNK>";

/// Default maximum number of generated words.
pub const DEFAULT_MAX_LENGTH: usize = 50;
/// Default minimum frequency for a word to enter the vocabulary.
pub const DEFAULT_MIN_FREQ: u64 = 2;

/// Represents a word-trigram language model.
///
/// The `TrigramModel` learns (word1, word2, word3) frequencies from a
/// training corpus and generates new text by sampling successive words
/// conditioned on the previous two.
///
/// # Responsibilities
/// - Normalize and tokenize a raw corpus into sentences
/// - Build a frequency-thresholded vocabulary and substitute rare words
/// - Accumulate trigram counts over padded sentences
/// - Sample next words from empirical context distributions
/// - Merge with another trigram model
///
/// # Invariants
/// - The context table is a denormalized cache of the trigram table: for
///   every observed triple both tables hold the same count, and the per
///   context totals agree. All increments go through a single write path
///   (`record`) to keep them synchronized.
/// - The vocabulary always contains the unknown symbol.
/// - Counts only grow; repeated `fit` calls accumulate across corpora.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrigramModel {
	/// Minimum global frequency for a word to enter the vocabulary.
	min_freq: u64,

	/// Admitted words, unknown symbol included. Frozen between fits.
	vocab: Vocabulary,

	/// Trigram table: word1 → word2 → (word3 → count).
	counts: HashMap<String, HashMap<String, ContextState>>,

	/// Context table: (word1, word2) → (word3 → count).
	/// Redundant with `counts`, kept for direct sampling lookup.
	context_counts: HashMap<(String, String), ContextState>,

	/// Names of the corpus files this model was built from.
	corpus_names: Vec<String>,
}

impl TrigramModel {
	/// Creates an empty model with the default frequency threshold.
	pub fn new() -> Self {
		Self::with_min_freq(DEFAULT_MIN_FREQ)
	}

	/// Creates an empty model with a custom frequency threshold.
	///
	/// A threshold of 1 admits every word; higher thresholds collapse rarer
	/// words to the unknown symbol during training.
	pub fn with_min_freq(min_freq: u64) -> Self {
		Self {
			min_freq,
			vocab: Vocabulary::new(),
			counts: HashMap::new(),
			context_counts: HashMap::new(),
			corpus_names: Vec::new(),
		}
	}

	/// Loads a `TrigramModel` from a corpus file if no binary cache exists,
	/// otherwise deserializes the cached model.
	///
	/// # Parameters
	/// - `filepath`: the input corpus text file.
	///
	/// # Behavior
	/// - Checks whether a `.bin` file exists next to the corpus for fast
	///   loading; uses `postcard` for compact serialization.
	/// - Otherwise reads the corpus, trains a fresh model on it, and writes
	///   the binary cache for future loads.
	/// - Records the corpus file stem in the model's corpus names.
	///
	/// # Errors
	/// Returns an error if file I/O or (de)serialization fails.
	pub fn from_corpus_file<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_data_path = build_output_path(&filepath, "bin")?;

		let mut model: TrigramModel;
		if binary_data_path.exists() {
			let bytes = std::fs::read(&binary_data_path)?;
			model = postcard::from_bytes(&bytes)?;
			log::debug!("loaded cached model from {}", binary_data_path.display());
		} else {
			let text = read_file(&filepath)?;
			model = Self::new();
			model.fit(&text);
			log::info!(
				"trained model from {} ({} words in vocabulary)",
				filepath.as_ref().display(),
				model.vocabulary_len()
			);

			let bytes = postcard::to_stdvec(&model)?;
			std::fs::write(&binary_data_path, bytes)?;
		}

		model.corpus_names.push(get_filename(&filepath)?);
		Ok(model)
	}

	/// Trains the model in place on the given corpus.
	///
	/// # Behavior
	/// - Normalizes the text into tokenized sentences.
	/// - Admits frequent words into the vocabulary, then rewrites
	///   out-of-vocabulary tokens to the unknown symbol.
	/// - Pads each sentence with two start symbols and one end symbol and
	///   counts every consecutive trigram, so a sentence of n tokens
	///   contributes exactly n + 1 trigrams.
	///
	/// # Notes
	/// - Padding is injected after substitution, so the start symbol never
	///   participates in vocabulary frequency accounting.
	/// - Calling `fit` again accumulates counts on top of the existing
	///   tables and grows the vocabulary; nothing is reset.
	pub fn fit(&mut self, text: &str) {
		let sentences = normalizer::clean_text(text);

		self.vocab.admit_frequent(&sentences, self.min_freq);
		let sentences = self.vocab.substitute(sentences);

		for sentence in &sentences {
			let mut padded: Vec<&str> = Vec::with_capacity(sentence.len() + 3);
			padded.push(START);
			padded.push(START);
			padded.extend(sentence.iter().map(String::as_str));
			padded.push(END);

			for window in padded.windows(3) {
				self.record(window[0], window[1], window[2], 1);
			}
		}

		log::debug!(
			"fit: {} sentences, vocabulary size {}",
			sentences.len(),
			self.vocab.len()
		);
	}

	/// Records `occurrences` observations of the trigram (w1, w2, w3).
	///
	/// Single write path for both tables: the trigram table and the context
	/// table are updated together, never one without the other.
	fn record(&mut self, w1: &str, w2: &str, w3: &str, occurrences: u64) {
		self.counts
			.entry(w1.to_owned())
			.or_default()
			.entry(w2.to_owned())
			.or_default()
			.add_transitions(w3, occurrences);

		self.context_counts
			.entry((w1.to_owned(), w2.to_owned()))
			.or_default()
			.add_transitions(w3, occurrences);
	}

	/// Samples the next word for the context (w1, w2).
	///
	/// Falls back to the unknown symbol when the context was never observed,
	/// so generation continues instead of failing; the unknown symbol then
	/// becomes part of the context.
	fn sample_next<R: Rng>(&self, w1: &str, w2: &str, rng: &mut R) -> String {
		match self.context_counts.get(&(w1.to_owned(), w2.to_owned())) {
			Some(state) => state.sample(rng).unwrap_or(UNKNOWN).to_owned(),
			None => UNKNOWN.to_owned(),
		}
	}

	/// Generates text using the thread-local random source.
	///
	/// Returns at most `max_length` space-joined words; the end symbol is
	/// never part of the output. See `generate_with` for the seedable
	/// variant.
	pub fn generate(&self, max_length: usize) -> String {
		self.generate_with(max_length, &mut rand::rng())
	}

	/// Generates text using a seeded random source.
	///
	/// Given a fixed seed and a fixed trained model, the output is
	/// reproducible.
	pub fn generate_seeded(&self, max_length: usize, seed: u64) -> String {
		self.generate_with(max_length, &mut StdRng::seed_from_u64(seed))
	}

	/// Generates text using any random source.
	///
	/// # Parameters
	/// - `max_length`: upper bound on the number of generated words;
	///   0 yields an empty string.
	/// - `rng`: the randomness source; pass a seeded `StdRng` for
	///   deterministic output.
	///
	/// # Behavior
	/// Starts from the (start, start) context and repeatedly samples the
	/// next word, advancing the context window by one word each step.
	/// Generation stops when the end symbol is drawn or `max_length` words
	/// have been produced, whichever comes first.
	pub fn generate_with<R: Rng>(&self, max_length: usize, rng: &mut R) -> String {
		let mut w1 = START.to_owned();
		let mut w2 = START.to_owned();
		let mut words: Vec<String> = Vec::new();

		for _ in 0..max_length {
			let next = self.sample_next(&w1, &w2, rng);
			if next == END {
				break;
			}

			w1 = std::mem::replace(&mut w2, next.clone());
			words.push(next);
		}

		words.join(" ")
	}

	/// Merges another trigram model into this one.
	///
	/// # Behavior
	/// - Every trigram count of `other` is added through the same write
	///   path as training, so both tables stay synchronized.
	/// - The vocabularies are unioned.
	/// - `self` keeps its own frequency threshold for future fits.
	pub fn merge(&mut self, other: &Self) {
		for (w1, by_second) in &other.counts {
			for (w2, state) in by_second {
				for (w3, occurrences) in state.transitions() {
					self.record(w1, w2, w3, occurrences);
				}
			}
		}

		self.vocab.absorb(&other.vocab);
		self.corpus_names.extend(other.corpus_names.iter().cloned());
	}

	/// Names of the corpus files this model was built from.
	pub fn get_corpus_names(&self) -> &Vec<String> {
		&self.corpus_names
	}

	/// Returns true if `word` was admitted into the vocabulary.
	pub fn vocabulary_contains(&self, word: &str) -> bool {
		self.vocab.contains(word)
	}

	/// Number of admitted words, unknown symbol included.
	pub fn vocabulary_len(&self) -> usize {
		self.vocab.len()
	}

	/// Number of times the context (w1, w2) was observed, read from the
	/// context table (0 if never seen).
	pub fn context_total(&self, w1: &str, w2: &str) -> u64 {
		self.context_counts
			.get(&(w1.to_owned(), w2.to_owned()))
			.map(ContextState::total)
			.unwrap_or(0)
	}

	/// Count of the triple (w1, w2, w3) read from the context table.
	pub fn context_count(&self, w1: &str, w2: &str, w3: &str) -> u64 {
		self.context_counts
			.get(&(w1.to_owned(), w2.to_owned()))
			.map(|state| state.count(w3))
			.unwrap_or(0)
	}

	/// Count of the triple (w1, w2, w3) read from the nested trigram table.
	///
	/// Always equal to `context_count` for the same triple; exposed
	/// separately so the table-agreement invariant is observable.
	pub fn trigram_count(&self, w1: &str, w2: &str, w3: &str) -> u64 {
		self.counts
			.get(w1)
			.and_then(|by_second| by_second.get(w2))
			.map(|state| state.count(w3))
			.unwrap_or(0)
	}
}

impl Default for TrigramModel {
	fn default() -> Self {
		Self::new()
	}
}
