use indexmap::IndexMap;

use rand::Rng;
use rand::prelude::IteratorRandom;

use serde::{Deserialize, Serialize};

/// Observed continuations of a single two-word context.
///
/// A `ContextState` stores every word seen after one (word1, word2) pair,
/// together with how many times it was seen. Conceptually this is a node in
/// a Markov chain whose outgoing edges are weighted by observation counts.
///
/// The context itself is the key under which the state is stored in the
/// model tables; it is not repeated here.
///
/// ## Responsibilities
/// - Accumulate transition occurrences during training
/// - Sample the next word from the empirical distribution
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Transitions iterate in insertion order, so sampling with a seeded
///   random source is reproducible
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ContextState {
	/// Outgoing transitions indexed by the next word.
	/// The value represents how many times this transition was observed.
	/// Example: { "sat" => 2, "ran" => 1 }
	transitions: IndexMap<String, u64>,
}

impl ContextState {
	/// Records `occurrences` observations of a transition toward `next_word`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is appended with the given count.
	pub fn add_transitions(&mut self, next_word: &str, occurrences: u64) {
		if let Some(count) = self.transitions.get_mut(next_word) {
			*count += occurrences;
		} else {
			self.transitions.insert(next_word.to_owned(), occurrences);
		}
	}

	/// Total number of times this context was observed.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	/// Occurrence count for a single continuation (0 if never seen).
	pub fn count(&self, next_word: &str) -> u64 {
		self.transitions.get(next_word).copied().unwrap_or(0)
	}

	/// Iterates over (next word, count) pairs in insertion order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(word, count)| (word.as_str(), *count))
	}

	/// Samples the next word from the empirical distribution.
	///
	/// Draws a uniform value in [0, 1) and walks the transitions in
	/// insertion order, accumulating `count / total`, returning the first
	/// word whose cumulative mass exceeds the draw.
	///
	/// Returns `None` if the state has no transitions.
	pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		if self.transitions.is_empty() {
			return None;
		}

		let total = self.total();
		if total == 0 {
			// Should not happen due to invariants, but kept for safety
			return None;
		}

		let draw: f64 = rng.random();
		let total = total as f64;

		let mut cumulative = 0.0;
		for (next_word, occurrences) in &self.transitions {
			cumulative += *occurrences as f64 / total;
			if draw < cumulative {
				return Some(next_word);
			}
		}

		// The cumulative sum can fall short of a draw very close to 1
		// through rounding; pick uniformly among the candidates instead.
		self.transitions.keys().choose(rng).map(String::as_str)
	}
}
