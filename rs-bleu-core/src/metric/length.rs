use crate::error::BleuError;

/// Returns the length of the reference closest to `candidate_len`.
///
/// When two reference lengths are equally distant from the candidate
/// length, the shorter one wins. This choice changes the brevity penalty
/// and must be kept.
///
/// Returns `None` if `references` is empty.
pub fn closest_length<T>(candidate_len: usize, references: &[Vec<T>]) -> Option<usize> {
	references
		.iter()
		.map(Vec::len)
		.min_by_key(|&len| (len.abs_diff(candidate_len), len))
}

/// Computes the corpus-level brevity penalty.
///
/// Sums candidate lengths (`c`) and their closest reference lengths (`r`)
/// over the whole corpus. If `c <= r` the penalty is `exp(1 - r / c)`,
/// otherwise `1.0`.
///
/// # Errors
/// - `BleuError::LengthMismatch` if the collections differ in length.
/// - `BleuError::NoReferences` if a candidate has an empty reference set.
/// - `BleuError::EmptyCandidates` if all candidates are empty.
pub fn brevity_penalty<T>(candidates: &[Vec<T>], references: &[Vec<Vec<T>>]) -> Result<f64, BleuError> {
	check_corpus(candidates, references)?;

	let mut bp_c = 0usize;
	let mut bp_r = 0usize;
	for (index, (candidate, refs)) in candidates.iter().zip(references).enumerate() {
		bp_c += candidate.len();
		bp_r += closest_length(candidate.len(), refs).ok_or(BleuError::NoReferences(index))?;
	}

	if bp_c == 0 {
		return Err(BleuError::EmptyCandidates);
	}

	let bp = if bp_c <= bp_r {
		(1.0 - bp_r as f64 / bp_c as f64).exp()
	} else {
		1.0
	};
	log::debug!("brevity penalty: c={bp_c}, r={bp_r}, bp={bp}");
	Ok(bp)
}

/// Checks that candidates and reference sets are paired one to one.
pub(crate) fn check_corpus<T>(candidates: &[Vec<T>], references: &[Vec<Vec<T>>]) -> Result<(), BleuError> {
	if candidates.len() != references.len() {
		return Err(BleuError::LengthMismatch {
			candidates: candidates.len(),
			references: references.len(),
		});
	}
	Ok(())
}
