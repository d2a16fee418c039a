//! Error types for BLEU scoring and statistics handling.

use std::fmt;

/// Errors returned by the scoring functions.
///
/// Expected edge cases (no n-grams at an order, no overlap at all) are
/// not errors: they produce zero counts or a zero score. These variants
/// cover inputs for which no score is defined.
#[derive(Debug)]
pub enum BleuError {
	/// The n-gram order was zero.
	InvalidOrder(usize),
	/// Candidate and reference collections have different lengths.
	LengthMismatch { candidates: usize, references: usize },
	/// The candidate at this index has no reference.
	NoReferences(usize),
	/// The candidates of a corpus hold no token at all.
	EmptyCandidates,
	/// Two statistics of different maximum orders were combined.
	OrderMismatch { expected: usize, found: usize },
	/// A flat statistics layout was not `2 + 2N` long with `N >= 1`.
	InvalidLayout(usize),
	/// An order of a statistics layout matched more n-grams than it holds.
	InvalidCounts { order: usize, matched: usize, total: usize },
	/// Summed statistics do not fit in `usize`.
	Overflow,
	/// A statistics snapshot could not be encoded or decoded.
	Codec(postcard::Error),
}

impl fmt::Display for BleuError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidOrder(n) => write!(f, "n-gram order must be >= 1, got {n}"),
			Self::LengthMismatch { candidates, references } => write!(
				f,
				"{candidates} candidates but {references} reference sets"
			),
			Self::NoReferences(index) => write!(f, "candidate {index} has no reference"),
			Self::EmptyCandidates => write!(f, "total candidate length is zero"),
			Self::OrderMismatch { expected, found } => write!(
				f,
				"statistics order mismatch: expected {expected}, found {found}"
			),
			Self::InvalidLayout(len) => write!(
				f,
				"invalid statistics layout of length {len} (expected 2 + 2N, N >= 1)"
			),
			Self::InvalidCounts { order, matched, total } => write!(
				f,
				"order {order} has {matched} matches for {total} n-grams"
			),
			Self::Overflow => write!(f, "statistics count overflow"),
			Self::Codec(e) => write!(f, "statistics snapshot codec error: {e}"),
		}
	}
}

impl std::error::Error for BleuError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Codec(e) => Some(e),
			_ => None,
		}
	}
}

impl From<postcard::Error> for BleuError {
	fn from(e: postcard::Error) -> Self {
		Self::Codec(e)
	}
}

/// Checks that an n-gram order is usable.
pub(crate) fn check_order(n: usize) -> Result<(), BleuError> {
	if n == 0 {
		return Err(BleuError::InvalidOrder(n));
	}
	Ok(())
}
