//! BLEU scoring library.
//!
//! This crate provides the BLEU metric for pre-tokenized sequences:
//! - N-gram counting and clipped (modified) precision
//! - Closest reference length and corpus brevity penalty
//! - Corpus-level BLEU with micro-averaged precisions
//! - Sentence-level BLEU, plain and add-one smoothed
//! - Accumulable per-pair statistics with a compact binary snapshot
//!
//! Everything here is a pure function over borrowed token slices.
//! Tokenization, file handling and parallelism are left to callers.

/// Scoring functions, statistics and configuration.
pub mod metric;

/// Error type shared by every fallible operation.
pub mod error;

pub use error::BleuError;
