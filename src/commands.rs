use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use crate::cli::{SignatureArgs, TataArgs};
use crate::errors::MotifError;
use crate::kmers::{save_signature_table, signatures_for_files, SignatureConfig};
use crate::repeats::RepeatScanner;
use crate::report;
use crate::sequence::{fasta_files, load_sequence};
use crate::tata::locate;

/// TATA-box partition and upstream repeat report for one FASTA file.
pub fn tata(args: TataArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_tata(&args, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn run_tata(args: &TataArgs, out: &mut impl Write) -> Result<()> {
    let seq = load_sequence(&args.fasta)
        .with_context(|| format!("Failed to read sequence from {}", args.fasta.display()))?;
    log::info!("Loaded {} bp from {}", seq.len(), args.fasta.display());

    match locate(&seq) {
        Ok(partition) => {
            report::write_partition(out, &seq, &partition)?;
            let scanner = RepeatScanner::with_unit_order(args.unit_order);
            match scanner.scan_upstream(&seq, &partition) {
                Some(upstream) => report::write_upstream(out, &upstream)?,
                None => log::info!("No upstream region; repeat scans skipped"),
            }
        }
        Err(MotifError::NoMotifFound) => {
            log::info!("{}", MotifError::NoMotifFound);
            report::write_no_tata_box(out, seq.len())?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// k-mer signature table for every FASTA file in a directory.
pub fn signature(args: SignatureArgs) -> Result<()> {
    let config = args.config();
    config.validate()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build_global()
        .context("Failed to initialise thread pool")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_signature(&args.input_dir, &config, &args.output, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Count, rank and tabulate every matching file of `input_dir` into `output`.
/// Returns the number of file blocks written; an empty directory writes no table.
pub fn run_signature(
    input_dir: &Path,
    config: &SignatureConfig,
    output: &Path,
    out: &mut impl Write,
) -> Result<usize> {
    let files = fasta_files(input_dir, &config.extension)
        .with_context(|| format!("Cannot list {}", input_dir.display()))?;
    if files.is_empty() {
        log::warn!(
            "The directory {} does not contain any *.{} files",
            input_dir.display(),
            config.extension
        );
        return Ok(0);
    }
    log::info!(
        "Counting {}-mers in {} files from {}",
        config.width,
        files.len(),
        input_dir.display()
    );

    let mut signatures = Vec::with_capacity(files.len());
    for (path, result) in signatures_for_files(&files, config) {
        match result {
            Ok(file_sig) => signatures.push(file_sig),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    writeln!(out, "The files within {} are as follows:", input_dir.display())?;
    report::write_file_listing(out, &signatures)?;

    save_signature_table(output, &signatures)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    writeln!(out, "Saved k-mer signatures to {}", output.display())?;
    Ok(signatures.len())
}
