use regex::Regex;

/// Cleans raw text and splits it into tokenized sentences.
///
/// - Lowercases the whole input.
/// - Replaces every character outside `a-z`, `0-9`, whitespace and `.!?`
///   with a space (so `don't` becomes the two tokens `don` and `t`).
/// - Splits on runs of sentence-terminal characters (`.`, `!`, `?`).
/// - Tokenizes each segment on whitespace; segments with no tokens
///   (pure punctuation, empty lines) produce no sentence.
///
/// Sentence order and token order are preserved.
pub fn clean_text(text: &str) -> Vec<Vec<String>> {
	// Both patterns are static and known-good
	let disallowed = Regex::new(r"[^a-z0-9\s.!?]").expect("Failed to build regex");
	let boundary = Regex::new(r"[.!?]+").expect("Failed to build regex");

	let text = text.to_lowercase();
	let cleaned = disallowed.replace_all(&text, " ");

	boundary
		.split(&cleaned)
		.filter_map(|segment| {
			let tokens: Vec<String> = segment.split_whitespace().map(str::to_owned).collect();
			if tokens.is_empty() { None } else { Some(tokens) }
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::clean_text;

	fn sentence(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| w.to_string()).collect()
	}

	#[test]
	fn lowercases_and_splits_sentences() {
		let sentences = clean_text("The cat SAT. The dog ran!");
		assert_eq!(sentences, vec![sentence(&["the", "cat", "sat"]), sentence(&["the", "dog", "ran"])]);
	}

	#[test]
	fn disallowed_characters_become_spaces() {
		let sentences = clean_text("don't stop");
		assert_eq!(sentences, vec![sentence(&["don", "t", "stop"])]);
	}

	#[test]
	fn punctuation_runs_are_one_boundary() {
		let sentences = clean_text("wait... what?! ok");
		assert_eq!(
			sentences,
			vec![sentence(&["wait"]), sentence(&["what"]), sentence(&["ok"])]
		);
	}

	#[test]
	fn empty_segments_are_dropped() {
		assert!(clean_text("...!!!???").is_empty());
		assert!(clean_text("").is_empty());
		assert!(clean_text("   \n  ").is_empty());
	}

	#[test]
	fn digits_are_kept() {
		let sentences = clean_text("route 66 is long.");
		assert_eq!(sentences, vec![sentence(&["route", "66", "is", "long"])]);
	}
}
