use std::hash::Hash;

use crate::error::BleuError;
use super::ngram::count_ngrams;

/// Computes the clipped n-gram counts of `candidate` at order `n`.
///
/// Returns `(matched, total)` where:
/// - `total` is the number of n-gram occurrences in the candidate
/// - `matched` credits each distinct n-gram at most as many times as it
///   appears in the single reference containing it most often
///
/// Counts are never summed across references. A candidate without any
/// n-gram at this order gives `(0, 0)`; callers must handle that case
/// before dividing.
///
/// # Errors
/// Returns `BleuError::InvalidOrder` if `n == 0`.
pub fn modified_precision<T: Eq + Hash>(
	candidate: &[T],
	references: &[Vec<T>],
	n: usize,
) -> Result<(usize, usize), BleuError> {
	let counts = count_ngrams(candidate, n)?;
	if counts.is_empty() {
		return Ok((0, 0));
	}

	let reference_counts = references
		.iter()
		.map(|reference| count_ngrams(reference, n))
		.collect::<Result<Vec<_>, _>>()?;

	let matched = counts
		.iter()
		.map(|(ngram, &count)| {
			let max_count = reference_counts
				.iter()
				.filter_map(|ref_counts| ref_counts.get(*ngram))
				.copied()
				.max()
				.unwrap_or(0);
			count.min(max_count)
		})
		.sum();
	let total = counts.values().sum();

	Ok((matched, total))
}
