use std::hash::Hash;

use crate::error::{check_order, BleuError};
use super::length::{brevity_penalty, check_corpus};
use super::precision::modified_precision;

/// Log precision assigned to an order with no match (or no n-gram) in the
/// whole corpus. It drives the geometric mean toward zero without failing.
pub const ZERO_PRECISION_LOG: f64 = -9999.0;

/// Computes corpus-level BLEU.
///
/// For each order `1..=max_order`, clipped match counts and candidate
/// n-gram counts are summed over every pair before dividing
/// (micro-averaging). The score is the brevity penalty times the
/// geometric mean of the per-order precisions.
///
/// # Parameters
/// - `candidates`: one tokenized candidate per segment.
/// - `references`: for each candidate, one or more tokenized references.
/// - `max_order`: highest n-gram order (usually `DEFAULT_MAX_ORDER`).
///
/// # Errors
/// - `BleuError::InvalidOrder` if `max_order == 0`.
/// - `BleuError::LengthMismatch` if the collections differ in length.
/// - `BleuError::NoReferences` if a candidate has no reference.
/// - `BleuError::EmptyCandidates` if every candidate is empty.
pub fn bleu<T: Eq + Hash>(
	candidates: &[Vec<T>],
	references: &[Vec<Vec<T>>],
	max_order: usize,
) -> Result<f64, BleuError> {
	check_order(max_order)?;
	check_corpus(candidates, references)?;

	let mut matched = vec![0usize; max_order];
	let mut total = vec![0usize; max_order];
	for (candidate, refs) in candidates.iter().zip(references) {
		for n in 1..=max_order {
			let (m, t) = modified_precision(candidate, refs, n)?;
			matched[n - 1] += m;
			total[n - 1] += t;
		}
	}

	let log_precisions: Vec<f64> = matched
		.iter()
		.zip(&total)
		.map(|(&m, &t)| log_precision(m, t))
		.collect();
	log::debug!("corpus precisions: matched={matched:?}, total={total:?}");

	let bp = brevity_penalty(candidates, references)?;
	let mean = log_precisions.iter().sum::<f64>() / max_order as f64;
	Ok(bp * mean.exp())
}

/// Log of `matched / total`, or the sentinel when either is zero.
fn log_precision(matched: usize, total: usize) -> f64 {
	if matched == 0 || total == 0 {
		return ZERO_PRECISION_LOG;
	}
	(matched as f64 / total as f64).ln()
}
