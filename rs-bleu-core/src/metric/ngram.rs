use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{check_order, BleuError};

/// Occurrence counts of the n-grams of one sequence.
///
/// Keys borrow their windows from the counted sequence, so token order
/// and adjacency are part of the key.
pub type NGramCounts<'a, T> = HashMap<&'a [T], usize>;

/// Counts every contiguous n-gram of `sequence`.
///
/// Windows overlap (stride 1). A sequence shorter than `n` has no n-gram
/// and yields an empty table.
///
/// # Errors
/// Returns `BleuError::InvalidOrder` if `n == 0`.
pub fn count_ngrams<T: Eq + Hash>(sequence: &[T], n: usize) -> Result<NGramCounts<'_, T>, BleuError> {
	check_order(n)?;

	let mut counts = HashMap::new();
	if sequence.len() < n {
		return Ok(counts);
	}

	for window in sequence.windows(n) {
		*counts.entry(window).or_insert(0) += 1;
	}
	Ok(counts)
}

/// Number of n-grams in a sequence of `len` tokens.
///
/// This is `max(len + 1 - n, 0)`.
pub fn ngram_total(len: usize, n: usize) -> usize {
	(len + 1).saturating_sub(n)
}
