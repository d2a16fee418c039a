//! Top-level module for the BLEU metric.
//!
//! The layers build on each other:
//! - N-gram counting (`ngram`)
//! - Clipped precision against a reference set (`precision`)
//! - Closest reference length and brevity penalty (`length`)
//! - Corpus-level aggregation (`corpus`)
//! - Per-pair statistics and sentence-level scores (`stats`, `sentence`)
//! - Scoring configuration (`config`)

/// Default maximum n-gram order (BLEU-4).
pub const DEFAULT_MAX_ORDER: usize = 4;

/// Contiguous n-gram extraction and counting.
pub mod ngram;

/// Closest reference length selection and corpus brevity penalty.
pub mod length;

/// Modified (clipped) n-gram precision.
pub mod precision;

/// Corpus-level BLEU with micro-averaged precisions.
///
/// Orders without any match are flagged with a large negative log value
/// rather than failing.
pub mod corpus;

/// Per-pair statistics that can be summed across a corpus
/// and scored once.
pub mod stats;

/// Sentence-level BLEU, plain and add-one smoothed.
pub mod sentence;

/// Scoring configuration: maximum order and smoothing strategy.
pub mod config;
