use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{check_order, BleuError};
use super::ngram::{count_ngrams, ngram_total};

/// Matched and total n-gram counts for a single order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderStats {
	/// Size of the multiset intersection of hypothesis and reference n-grams.
	pub matched: usize,
	/// Number of n-grams in the hypothesis.
	pub total: usize,
}

/// Sufficient statistics of BLEU for one or more hypothesis/reference pairs.
///
/// Statistics of many pairs are summed with `merge`, then scored once
/// with `bleu` or `smoothed_bleu`. No recomputation is needed when a
/// pair is added.
///
/// # Layout
/// The flat form (`to_vec`) is
/// `[hypothesis_len, reference_len, matched_1, total_1, ..., matched_N, total_N]`,
/// always `2 + 2N` values long.
///
/// # Invariants
/// - `orders` holds exactly one entry per order `1..=N`, with `N >= 1`
/// - `matched <= total` for each order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BleuStats {
	hypothesis_len: usize,
	reference_len: usize,
	orders: Vec<OrderStats>,
}

impl BleuStats {
	/// Creates zeroed statistics for orders `1..=max_order`.
	///
	/// Useful as the starting point of an accumulation.
	///
	/// # Errors
	/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
	pub fn empty(max_order: usize) -> Result<Self, BleuError> {
		check_order(max_order)?;
		Ok(Self {
			hypothesis_len: 0,
			reference_len: 0,
			orders: vec![OrderStats::default(); max_order],
		})
	}

	/// Highest n-gram order covered.
	pub fn max_order(&self) -> usize {
		self.orders.len()
	}

	/// Total hypothesis length.
	pub fn hypothesis_len(&self) -> usize {
		self.hypothesis_len
	}

	/// Total reference length.
	pub fn reference_len(&self) -> usize {
		self.reference_len
	}

	/// Per-order counts, index 0 being unigrams.
	pub fn orders(&self) -> &[OrderStats] {
		&self.orders
	}

	/// Adds the counts of `other` into `self`, element-wise.
	///
	/// `self` is left untouched when an error is returned.
	///
	/// # Errors
	/// - `BleuError::OrderMismatch` if the maximum orders differ.
	/// - `BleuError::Overflow` if a summed count does not fit in `usize`.
	pub fn merge(&mut self, other: &Self) -> Result<(), BleuError> {
		if self.max_order() != other.max_order() {
			return Err(BleuError::OrderMismatch {
				expected: self.max_order(),
				found: other.max_order(),
			});
		}

		let orders = self
			.orders
			.iter()
			.zip(&other.orders)
			.map(|(order, other_order)| {
				Ok(OrderStats {
					matched: checked_sum(order.matched, other_order.matched)?,
					total: checked_sum(order.total, other_order.total)?,
				})
			})
			.collect::<Result<Vec<_>, BleuError>>()?;

		*self = Self {
			hypothesis_len: checked_sum(self.hypothesis_len, other.hypothesis_len)?,
			reference_len: checked_sum(self.reference_len, other.reference_len)?,
			orders,
		};
		Ok(())
	}

	/// Returns the flat `2 + 2N` layout.
	pub fn to_vec(&self) -> Vec<usize> {
		let mut values = Vec::with_capacity(2 + 2 * self.orders.len());
		values.push(self.hypothesis_len);
		values.push(self.reference_len);
		for order in &self.orders {
			values.push(order.matched);
			values.push(order.total);
		}
		values
	}

	/// Rebuilds statistics from the flat `2 + 2N` layout.
	///
	/// # Errors
	/// - `BleuError::InvalidLayout` if the length is odd or below 4.
	/// - `BleuError::InvalidCounts` if an order matches more n-grams than it has.
	pub fn from_slice(values: &[usize]) -> Result<Self, BleuError> {
		if values.len() < 4 || values.len() % 2 != 0 {
			return Err(BleuError::InvalidLayout(values.len()));
		}

		let orders = values[2..]
			.chunks_exact(2)
			.map(|pair| OrderStats { matched: pair[0], total: pair[1] })
			.collect();
		let stats = Self {
			hypothesis_len: values[0],
			reference_len: values[1],
			orders,
		};
		stats.check_counts()?;
		Ok(stats)
	}

	/// Encodes the statistics as a compact `postcard` snapshot.
	///
	/// Meant for shipping partial statistics between workers.
	pub fn to_bytes(&self) -> Result<Vec<u8>, BleuError> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes a snapshot produced by `to_bytes`.
	///
	/// # Errors
	/// - `BleuError::Codec` if the bytes are not a valid snapshot.
	/// - `BleuError::InvalidLayout` if the snapshot holds no order.
	/// - `BleuError::InvalidCounts` if an order matches more n-grams than it has.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, BleuError> {
		let stats: Self = postcard::from_bytes(bytes)?;
		if stats.orders.is_empty() {
			return Err(BleuError::InvalidLayout(2));
		}
		stats.check_counts()?;
		Ok(stats)
	}

	/// Checks `matched <= total` on every order.
	fn check_counts(&self) -> Result<(), BleuError> {
		for (i, order) in self.orders.iter().enumerate() {
			if order.matched > order.total {
				return Err(BleuError::InvalidCounts {
					order: i + 1,
					matched: order.matched,
					total: order.total,
				});
			}
		}
		Ok(())
	}

	/// Scores the statistics with the unsmoothed sentence formula.
	///
	/// Returns `0.0` as soon as any of the `2 + 2N` values is zero.
	/// Otherwise returns `exp(min(0, 1 - r/c) + mean(ln(matched / total)))`.
	pub fn bleu(&self) -> f64 {
		if self.hypothesis_len == 0
			|| self.reference_len == 0
			|| self.orders.iter().any(|o| o.matched == 0 || o.total == 0)
		{
			return 0.0;
		}

		let log_precision = self
			.orders
			.iter()
			.map(|o| (o.matched as f64 / o.total as f64).ln())
			.sum::<f64>()
			/ self.max_order() as f64;
		self.combine(log_precision)
	}

	/// Scores the statistics with add-one smoothing on every order.
	///
	/// Each order contributes `ln((1 + matched) / (1 + total))`, so a missing
	/// overlap lowers the score without zeroing it. An empty hypothesis
	/// scores `0.0`.
	pub fn smoothed_bleu(&self) -> f64 {
		if self.hypothesis_len == 0 {
			return 0.0;
		}

		let log_precision = self
			.orders
			.iter()
			.map(|o| ((1.0 + o.matched as f64) / (1.0 + o.total as f64)).ln())
			.sum::<f64>()
			/ self.max_order() as f64;
		self.combine(log_precision)
	}

	/// Folds the brevity penalty into the exponent.
	fn combine(&self, log_precision: f64) -> f64 {
		let c = self.hypothesis_len as f64;
		let r = self.reference_len as f64;
		((1.0 - r / c).min(0.0) + log_precision).exp()
	}
}

fn checked_sum(a: usize, b: usize) -> Result<usize, BleuError> {
	a.checked_add(b).ok_or(BleuError::Overflow)
}

/// Computes the BLEU statistics of one hypothesis against one reference.
///
/// For each order `n`, `matched` is the multiset intersection size of the
/// hypothesis and reference n-grams, and `total` is `max(len + 1 - n, 0)`.
///
/// # Errors
/// Returns `BleuError::InvalidOrder` if `max_order == 0`.
pub fn bleu_stats<T: Eq + Hash>(hypothesis: &[T], reference: &[T], max_order: usize) -> Result<BleuStats, BleuError> {
	check_order(max_order)?;

	let mut orders = Vec::with_capacity(max_order);
	for n in 1..=max_order {
		let hyp_counts = count_ngrams(hypothesis, n)?;
		let ref_counts = count_ngrams(reference, n)?;
		let matched = hyp_counts
			.iter()
			.map(|(ngram, &count)| count.min(ref_counts.get(*ngram).copied().unwrap_or(0)))
			.sum();
		orders.push(OrderStats { matched, total: ngram_total(hypothesis.len(), n) });
	}

	let stats = BleuStats {
		hypothesis_len: hypothesis.len(),
		reference_len: reference.len(),
		orders,
	};
	log::trace!("bleu stats: {:?}", stats.to_vec());
	Ok(stats)
}
