use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{check_order, BleuError};
use super::DEFAULT_MAX_ORDER;
use super::corpus::bleu;
use super::sentence::{sentence_bleu, smoothed_sentence_bleu};

/// Strategy applied to per-order precisions at sentence level.
///
/// # Variants
/// - `None`: plain ratios; any zero statistic gives a zero score.
/// - `AddOne`: add one to both sides of every ratio.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Smoothing {
	#[default]
	None,
	AddOne,
}

/// Scoring parameters shared by a batch of calls.
///
/// # Invariants
/// - `max_order` is always >= 1
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BleuConfig {
	/// Highest n-gram order taken into account.
	max_order: usize,

	/// Sentence-level smoothing strategy.
	///
	/// Only `sentence_score` reads it; `corpus_score` is never smoothed.
	pub smoothing: Smoothing,
}

impl Default for BleuConfig {
	fn default() -> Self {
		Self { max_order: DEFAULT_MAX_ORDER, smoothing: Smoothing::None }
	}
}

impl BleuConfig {
	/// Creates a configuration with the given order and no smoothing.
	///
	/// # Errors
	/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
	pub fn new(max_order: usize) -> Result<Self, BleuError> {
		check_order(max_order)?;
		Ok(Self { max_order, smoothing: Smoothing::None })
	}

	/// Returns the current maximum order.
	pub fn max_order(&self) -> usize {
		self.max_order
	}

	/// Sets the maximum order.
	///
	/// # Errors
	/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
	pub fn set_max_order(&mut self, max_order: usize) -> Result<(), BleuError> {
		check_order(max_order)?;
		self.max_order = max_order;
		Ok(())
	}

	/// Returns a copy using the given smoothing strategy.
	pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
		self.smoothing = smoothing;
		self
	}

	/// Scores one hypothesis against one reference with this configuration.
	pub fn sentence_score<T: Eq + Hash>(&self, hypothesis: &[T], reference: &[T]) -> Result<f64, BleuError> {
		match self.smoothing {
			Smoothing::None => sentence_bleu(hypothesis, reference, self.max_order),
			Smoothing::AddOne => smoothed_sentence_bleu(hypothesis, reference, self.max_order),
		}
	}

	/// Scores a whole corpus with this configuration.
	///
	/// Corpus-level BLEU is never smoothed; `smoothing` is ignored here.
	pub fn corpus_score<T: Eq + Hash>(
		&self,
		candidates: &[Vec<T>],
		references: &[Vec<Vec<T>>],
	) -> Result<f64, BleuError> {
		bleu(candidates, references, self.max_order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default() {
		let config = BleuConfig::default();
		assert_eq!(config.max_order(), 4);
		assert_eq!(config.smoothing, Smoothing::None);
	}

	#[test]
	fn test_set_max_order() {
		let mut config = BleuConfig::new(2).unwrap();
		assert!(config.set_max_order(0).is_err());
		assert_eq!(config.max_order(), 2);
		config.set_max_order(3).unwrap();
		assert_eq!(config.max_order(), 3);
		assert!(BleuConfig::new(0).is_err());
	}

	#[test]
	fn test_sentence_score_dispatch() {
		let hyp = ["a", "b", "c", "d"];
		let reference = ["e", "f", "g", "h"];
		let config = BleuConfig::default();
		assert_eq!(config.sentence_score(&hyp, &reference).unwrap(), 0.0);
		let smoothed = config.with_smoothing(Smoothing::AddOne);
		assert!(smoothed.sentence_score(&hyp, &reference).unwrap() > 0.0);
	}

	#[test]
	fn test_corpus_score_ignores_smoothing() {
		// no bigram match: corpus score collapses with or without smoothing
		let candidates = vec![vec!["a", "b"]];
		let references = vec![vec![vec!["b", "a"]]];
		let plain = BleuConfig::new(2).unwrap();
		let smoothed = plain.with_smoothing(Smoothing::AddOne);
		let expected = plain.corpus_score(&candidates, &references).unwrap();
		assert_eq!(smoothed.corpus_score(&candidates, &references).unwrap(), expected);
		assert!(expected < 1e-100);
		assert!(smoothed.sentence_score(&candidates[0], &references[0][0]).unwrap() > 0.0);
	}

	#[test]
	fn test_corpus_score() {
		let candidates = vec![vec!["a", "b"]];
		let references = vec![vec![vec!["a", "b"]]];
		let config = BleuConfig::new(2).unwrap();
		assert!((config.corpus_score(&candidates, &references).unwrap() - 1.0).abs() < 1e-12);
	}
}
