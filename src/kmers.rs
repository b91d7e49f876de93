use ahash::RandomState;
use csv::WriterBuilder;
use hashbrown::HashMap;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::errors::{MotifError, Result};
use crate::sequence::{load_sequence, Composition};

#[derive(Debug, Clone, Copy)]
struct KmerTally {
    count: usize,
    first_seen: usize, // order of first appearance, breaks ranking ties
}

/// Occurrences of every upper-cased window of a fixed width.
#[derive(Debug)]
pub struct KmerCounts {
    total_windows: usize,
    counts: HashMap<Vec<u8>, KmerTally, RandomState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedMotif {
    pub rank: usize,
    pub motif: String,
    pub frequency: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub total_windows: usize,
    pub ranked: Vec<RankedMotif>,
}

impl KmerCounts {
    /// Slide a window of `width` over `seq` with stride 1 and tally each window.
    pub fn count(seq: &[u8], width: usize) -> Result<Self> {
        if width == 0 {
            return Err(MotifError::invalid("width", width, "must be at least 1"));
        }

        let mut counts: HashMap<Vec<u8>, KmerTally, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut key = Vec::with_capacity(width);
        for window in seq.windows(width) {
            key.clear();
            key.extend(window.iter().map(u8::to_ascii_uppercase));
            if let Some(tally) = counts.get_mut(key.as_slice()) {
                tally.count += 1;
            } else {
                let first_seen = counts.len();
                counts.insert(key.clone(), KmerTally { count: 1, first_seen });
            }
        }

        let total_windows = (seq.len() + 1).saturating_sub(width);
        Ok(KmerCounts {
            total_windows,
            counts,
        })
    }

    pub fn total_windows(&self) -> usize {
        self.total_windows
    }

    /// The `top_n` most frequent motifs; equal counts keep first-appearance order.
    pub fn top(&self, top_n: usize) -> Vec<RankedMotif> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        entries
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(i, (motif, tally))| RankedMotif {
                rank: i + 1,
                motif: String::from_utf8_lossy(motif).into_owned(),
                frequency: tally.count,
                proportion: tally.count as f64 / self.total_windows as f64,
            })
            .collect()
    }
}

/// Count every window of `width` in `seq` and rank the `top_n` most frequent.
pub fn count_and_rank(seq: &[u8], width: usize, top_n: usize) -> Result<Signature> {
    if top_n == 0 {
        return Err(MotifError::invalid("top_n", top_n, "must be at least 1"));
    }
    let counts = KmerCounts::count(seq, width)?;
    Ok(Signature {
        total_windows: counts.total_windows(),
        ranked: counts.top(top_n),
    })
}

/// Parameters of a directory signature run.
#[derive(Debug, Clone)]
pub struct SignatureConfig {
    pub width: usize,
    pub width_bounds: RangeInclusive<usize>,
    pub top_n: usize,
    pub extension: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        SignatureConfig {
            width: 4,
            width_bounds: 4..=8,
            top_n: 10,
            extension: "fna".to_string(),
        }
    }
}

impl SignatureConfig {
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (*self.width_bounds.start(), *self.width_bounds.end());
        if min == 0 || min > max {
            return Err(MotifError::invalid(
                "width_bounds",
                format!("{min}..={max}"),
                "must be a non-empty range starting at 1 or more",
            ));
        }
        if !self.width_bounds.contains(&self.width) {
            return Err(MotifError::invalid(
                "width",
                self.width,
                format!("must be between {min} and {max} (inclusive)"),
            ));
        }
        if self.top_n == 0 {
            return Err(MotifError::invalid("top_n", self.top_n, "must be at least 1"));
        }
        Ok(())
    }
}

/// Signature of one input file.
#[derive(Debug, Clone)]
pub struct FileSignature {
    pub path: PathBuf,
    pub seq_len: usize,
    pub composition: Composition,
    pub signature: Signature,
}

pub fn signature_for_file(path: &Path, config: &SignatureConfig) -> Result<FileSignature> {
    let seq = load_sequence(path)?;
    let signature = count_and_rank(&seq, config.width, config.top_n)?;
    log::debug!(
        "{}: {} bp, {} windows of width {}",
        path.display(),
        seq.len(),
        signature.total_windows,
        config.width
    );
    Ok(FileSignature {
        path: path.to_path_buf(),
        seq_len: seq.len(),
        composition: Composition::of(&seq),
        signature,
    })
}

/// Process `files` in parallel. Results come back in the order of `files`,
/// and a failing file does not affect the others.
pub fn signatures_for_files(
    files: &[PathBuf],
    config: &SignatureConfig,
) -> Vec<(PathBuf, Result<FileSignature>)> {
    files
        .par_iter()
        .map(|path| (path.clone(), signature_for_file(path, config)))
        .collect()
}

/// Write one CSV block per file: file/motif-count line, column header,
/// ranked rows, blank separator.
pub fn write_signature_table<W: Write>(mut out: W, signatures: &[FileSignature]) -> Result<()> {
    for file_sig in signatures {
        {
            let mut writer = WriterBuilder::new().flexible(true).from_writer(&mut out);
            writer.write_record([
                format!("FILE: {}", file_sig.path.display()),
                format!("Number of motifs: {}", file_sig.signature.total_windows),
            ])?;
            writer.write_record(["Rank", "Motif", "Frequency", "Proportion"])?;
            for ranked in &file_sig.signature.ranked {
                writer.write_record([
                    ranked.rank.to_string(),
                    ranked.motif.clone(),
                    ranked.frequency.to_string(),
                    format!("{:.6}", ranked.proportion),
                ])?;
            }
            writer.flush()?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_signature_table(output_path: &Path, signatures: &[FileSignature]) -> Result<()> {
    let file = File::create(output_path)?;
    write_signature_table(BufWriter::new(file), signatures)
}
