use std::hash::Hash;

use crate::error::BleuError;
use super::stats::bleu_stats;

/// Computes sentence-level BLEU of `hypothesis` against one `reference`.
///
/// Strict: if any statistic is zero (no match at some order, a
/// hypothesis shorter than `max_order`, an empty side) the score is `0.0`.
/// Otherwise the brevity penalty is folded into the exponent:
/// `exp(min(0, 1 - r/c) + mean(ln(matched / total)))`.
///
/// # Errors
/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
pub fn sentence_bleu<T: Eq + Hash>(hypothesis: &[T], reference: &[T], max_order: usize) -> Result<f64, BleuError> {
	Ok(bleu_stats(hypothesis, reference, max_order)?.bleu())
}

/// Computes sentence-level BLEU with add-one smoothing.
///
/// Same formula as `sentence_bleu`, but each order uses
/// `ln((1 + matched) / (1 + total))` and there is no zero short-circuit,
/// so short or loosely matching sentences still get a positive score.
///
/// # Errors
/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
pub fn smoothed_sentence_bleu<T: Eq + Hash>(
	hypothesis: &[T],
	reference: &[T],
	max_order: usize,
) -> Result<f64, BleuError> {
	Ok(bleu_stats(hypothesis, reference, max_order)?.smoothed_bleu())
}
