use std::sync::mpsc;
use std::thread;

use rs_bleu_core::metric::config::{BleuConfig, Smoothing};
use rs_bleu_core::metric::corpus::bleu;
use rs_bleu_core::metric::length::{brevity_penalty, closest_length};
use rs_bleu_core::metric::precision::modified_precision;
use rs_bleu_core::metric::stats::{bleu_stats, BleuStats};
use rs_bleu_core::metric::DEFAULT_MAX_ORDER;

/// Splits a sentence on whitespace. Real callers bring their own tokenizer.
fn tokens(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_owned).collect()
}

/// Accumulates the statistics of every pair, one chunk per worker thread.
///
/// Each thread builds a partial `BleuStats` and ships it back as a
/// postcard snapshot; partial statistics are then merged.
fn parallel_stats(pairs: &[(Vec<String>, Vec<String>)], max_order: usize) -> Result<BleuStats, Box<dyn std::error::Error>> {
    let chunks = num_cpus::get().max(1);
    let chunk_size = pairs.len().div_ceil(chunks).max(1);

    let (tx, rx) = mpsc::channel();
    for chunk in pairs.chunks(chunk_size) {
        let tx = tx.clone();
        let chunk = chunk.to_vec();

        thread::spawn(move || {
            let partial = BleuStats::empty(max_order).and_then(|mut partial| {
                for (hypothesis, reference) in &chunk {
                    partial.merge(&bleu_stats(hypothesis, reference, max_order)?)?;
                }
                partial.to_bytes()
            });
            tx.send(partial).expect("Failed to send from thread");
        });
    }
    drop(tx);

    let mut stats = BleuStats::empty(max_order)?;
    for partial in rx.iter() {
        stats.merge(&BleuStats::from_bytes(&partial?)?)?;
    }
    Ok(stats)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Candidates and their references, already tokenized
    let candidates = vec![
        tokens("it is a guide to action which ensures that the military always obeys the commands of the party"),
        tokens("he read the book because he was interested in world history"),
        tokens("the cat sat on the mat"),
    ];
    let references = vec![
        vec![
            tokens("it is a guide to action that ensures that the military will forever heed party commands"),
            tokens("it is the guiding principle which guarantees the military forces always being under the command of the party"),
            tokens("it is the practical guide for the army always to heed the directions of the party"),
        ],
        vec![tokens("he was interested in world history because he read the book")],
        vec![tokens("the cat is on the mat"), tokens("there is a cat on the mat")],
    ];

    // Building blocks
    let (matched, total) = modified_precision(&candidates[2], &references[2], 1)?;
    println!("Unigram precision of candidate 3: {}/{}", matched, total);
    println!(
        "Closest reference length of candidate 1: {:?}",
        closest_length(candidates[0].len(), &references[0])
    );
    println!("Corpus brevity penalty: {:.4}", brevity_penalty(&candidates, &references)?);

    // Corpus-level BLEU-4
    println!("Corpus BLEU: {:.4}", bleu(&candidates, &references, DEFAULT_MAX_ORDER)?);

    // Sentence-level scores against the first reference, plain then smoothed
    let plain = BleuConfig::default();
    let smoothed = plain.with_smoothing(Smoothing::AddOne);
    for (i, (candidate, refs)) in candidates.iter().zip(&references).enumerate() {
        println!(
            "Sentence {}: BLEU {:.4}, smoothed BLEU {:.4}",
            i + 1,
            plain.sentence_score(candidate, &refs[0])?,
            smoothed.sentence_score(candidate, &refs[0])?,
        );
    }

    // Accumulate statistics over many pairs in parallel, then score once
    let pairs: Vec<(Vec<String>, Vec<String>)> = candidates
        .iter()
        .zip(&references)
        .map(|(candidate, refs)| (candidate.clone(), refs[0].clone()))
        .cycle()
        .take(300)
        .collect();
    let stats = parallel_stats(&pairs, DEFAULT_MAX_ORDER)?;
    println!("Accumulated statistics: {:?}", stats.to_vec());
    println!("Accumulated BLEU: {:.4}, smoothed: {:.4}", stats.bleu(), stats.smoothed_bleu());

    Ok(())
}
