//! Top-level module for the trigram generation system.
//!
//! This crate provides a word-trigram text generator, including:
//! - The trigram model itself (`TrigramModel`)
//! - Internal text normalization (`normalizer`)
//! - Internal vocabulary management (`Vocabulary`)
//! - Internal per-context transition states (`ContextState`)
//! - A multi-model interface (`Generator`)

/// High-level interface for managing several trigram models at once.
///
/// Exposes corpus-directory loading, per-model generation with optional
/// seeding, and model merging.
pub mod generator;

/// Word-trigram model.
///
/// Handles corpus ingestion, vocabulary construction, trigram counting,
/// probabilistic next-word sampling, and model merging.
pub mod trigram_model;

/// Internal representation of a single sampling context (word pair).
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod context_state;

/// Internal text cleanup and sentence tokenization.
///
/// Not exposed.
mod normalizer;

/// Internal vocabulary with frequency-threshold admission and
/// unknown-word substitution.
///
/// Not exposed.
mod vocabulary;
