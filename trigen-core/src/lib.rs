//! Word-trigram text generation library.
//!
//! This crate provides a trigram language model including:
//! - Text normalization and sentence tokenization
//! - Frequency-thresholded vocabulary with unknown-word substitution
//! - Trigram counting over padded sentences
//! - Probabilistic generation with swappable randomness
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core trigram model and generation logic.
///
/// This module exposes the high-level model and generator interfaces while
/// keeping internal representations private.
pub mod model;

/// I/O utilities (corpus loading, path helpers).
pub mod io;
