use std::collections::HashMap;
use std::path::Path;

use crate::io;
use super::trigram_model::TrigramModel;

/// High-level interface managing several named trigram models.
///
/// # Responsibilities
/// - Load one `TrigramModel` per corpus file in a directory
/// - Provide per-model generation, unseeded or seeded
/// - Merge with another `Generator`
#[derive(Debug, Default)]
pub struct Generator {
	models: HashMap<String, TrigramModel>,
}

impl Generator {
	/// Creates a generator by training or loading every `.txt` corpus in a
	/// directory.
	///
	/// # Parameters
	/// - `filepath`: Path to a directory containing corpus files.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Behavior
	/// - Lists all files with the `.txt` extension in the given directory.
	/// - Loads each corpus into a named model; the model name is derived
	///   from the file name (without extension).
	/// - Cached `.bin` models next to a corpus are reused instead of
	///   retraining.
	///
	/// # Errors
	/// - Returns an error if the path does not exist or is not a directory.
	/// - Returns an error if a model fails to load.
	///
	/// # Notes
	/// - Only files directly contained in the directory are loaded
	///   (subdirectories are ignored).
	pub fn new<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let mut generator = Self {
			models: HashMap::new(),
		};

		let string_path = match filepath.as_ref().to_str() {
			Some(s) => s,
			None => return Err("Invalid filepath".into()),
		};
		// Normalize "folder" / "folder/"
		let folder = io::normalize_folder(string_path);

		if !folder.is_dir() {
			return Err(format!("Expected a directory, got: {}", folder.display()).into());
		}

		for file in io::list_files(&folder, "txt")? {
			let full_path = folder.join(&file);
			generator.load_model(&full_path)?;
		}

		Ok(generator)
	}

	/// Returns the list of loaded model names.
	pub fn get_model_names(&self) -> Vec<String> {
		self.models.keys().map(|k| k.to_owned()).collect::<Vec<_>>()
	}

	/// Loads a single corpus file as a named model.
	///
	/// # Errors
	/// Returns an error if the model is already loaded or if file I/O fails.
	pub fn load_model<P: AsRef<Path>>(&mut self, filepath: P) -> Result<(), Box<dyn std::error::Error>> {
		let key = io::get_filename(&filepath)?;
		if self.models.contains_key(&key) {
			return Err(Box::from("Model already loaded".to_owned()));
		}
		let model = TrigramModel::from_corpus_file(filepath.as_ref())?;
		self.models.insert(key, model);
		Ok(())
	}

	/// Generates text from the named model using the thread-local random
	/// source.
	///
	/// # Errors
	/// Returns an error if no model with that name is loaded.
	pub fn generate(&self, model: &str, max_length: usize) -> Result<String, String> {
		match self.models.get(model) {
			Some(model) => Ok(model.generate(max_length)),
			None => Err(format!("Model {} not found", model)),
		}
	}

	/// Generates reproducible text from the named model using a seeded
	/// random source.
	///
	/// # Errors
	/// Returns an error if no model with that name is loaded.
	pub fn generate_seeded(&self, model: &str, max_length: usize, seed: u64) -> Result<String, String> {
		match self.models.get(model) {
			Some(model) => Ok(model.generate_seeded(max_length, seed)),
			None => Err(format!("Model {} not found", model)),
		}
	}

	/// Merges another `Generator` into this one.
	///
	/// # Notes
	/// - Models sharing a name are merged; new ones are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (k, t) in &other.models {
			if let Some(existing) = self.models.get_mut(k) {
				existing.merge(t);
			} else {
				self.models.insert(k.clone(), t.clone());
			}
		}
	}
}
