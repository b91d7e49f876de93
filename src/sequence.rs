use needletail::errors::ParseErrorKind;
use needletail::parse_fastx_reader;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{MotifError, Result};

/// Half-open interval `[start, end)` over a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Region { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 1-based inclusive start used in reports.
    pub fn display_start(&self) -> usize {
        self.start + 1
    }

    /// 1-based inclusive end used in reports.
    pub fn display_end(&self) -> usize {
        self.end
    }

    pub fn slice<'a>(&self, seq: &'a [u8]) -> &'a [u8] {
        &seq[self.start..self.end]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} : {} ]", self.display_start(), self.display_end())
    }
}

/// Load a FASTA file as one lower-cased sequence. Headers are dropped and the
/// sequence lines of every record are joined in file order.
///
/// Text that needletail does not recognise as FASTA/FASTQ is read leniently:
/// the first line is dropped and the remaining lines are joined.
pub fn load_sequence(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(MotifError::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    // needletail refuses empty input
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = match parse_fastx_reader(bytes.as_slice()) {
        Ok(reader) => reader,
        Err(err) if matches!(err.kind, ParseErrorKind::UnknownFormat) => {
            log::debug!("{}: no FASTA marker, dropping the first line", path.display());
            return Ok(join_after_first_line(&bytes));
        }
        Err(err) => return Err(err.into()),
    };

    let mut sequence = Vec::new();
    while let Some(record) = reader.next() {
        let seqrec = record?;
        sequence.extend(seqrec.seq().iter().map(u8::to_ascii_lowercase));
    }
    Ok(sequence)
}

fn join_after_first_line(bytes: &[u8]) -> Vec<u8> {
    bytes
        .split(|&b| b == b'\n')
        .skip(1)
        .flat_map(|line| line.trim_ascii().iter().map(u8::to_ascii_lowercase))
        .collect()
}

/// Files in `dir` whose extension is `extension`, sorted by name.
pub fn fasta_files(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MotifError::FileNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Nucleotide tally of a sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Composition {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub t: usize,
    pub other: usize,
}

impl Composition {
    pub fn of(seq: &[u8]) -> Self {
        let mut comp = Composition::default();
        for &base in seq {
            match base.to_ascii_uppercase() {
                b'A' => comp.a += 1,
                b'C' => comp.c += 1,
                b'G' => comp.g += 1,
                b'T' => comp.t += 1,
                _ => comp.other += 1,
            }
        }
        comp
    }

    pub fn total(&self) -> usize {
        self.a + self.c + self.g + self.t + self.other
    }

    /// Share of `base` among all symbols. Symbols outside ACGT share the `other` tally.
    pub fn proportion(&self, base: u8) -> f64 {
        let count = match base.to_ascii_uppercase() {
            b'A' => self.a,
            b'C' => self.c,
            b'G' => self.g,
            b'T' => self.t,
            _ => self.other,
        };
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64,
        }
    }

    pub fn percent(&self, base: u8) -> f64 {
        self.proportion(base) * 100.0
    }

    /// Likelihood of `motif` at one position if bases were drawn independently
    /// with this composition: the product of its base proportions.
    pub fn expected_proportion(&self, motif: &[u8]) -> f64 {
        motif.iter().map(|&base| self.proportion(base)).product()
    }

    /// G+C over all symbols, 0.0 for an empty sequence.
    pub fn gc_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.g + self.c) as f64 / total as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_region_display_is_one_based() {
        let region = Region::new(4, 12);
        assert_eq!(region.len(), 8);
        assert_eq!(region.display_start(), 5);
        assert_eq!(region.display_end(), 12);
        assert_eq!(region.to_string(), "[ 5 : 12 ]");
        assert!(Region::new(3, 3).is_empty());
    }

    #[test]
    fn test_load_sequence_joins_lines_and_lowercases() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "gene.fna", ">gene1 test\nGGGGTATA\nAAAGcccc\n");
        let seq = load_sequence(&path).unwrap();
        assert_eq!(seq, b"ggggtataaaagcccc");
    }

    #[test]
    fn test_load_sequence_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_sequence(dir.path().join("absent.fna")).unwrap_err();
        assert!(matches!(err, MotifError::FileNotFound(_)));
    }

    #[test]
    fn test_load_sequence_without_marker() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "bare.fna", "ggggtataaaag\ncccc\n");
        assert_eq!(load_sequence(&path).unwrap(), b"cccc");

        let path = write_file(dir.path(), "plain.fna", "gene 7 promoter\r\nACGT\r\n ac \n");
        assert_eq!(load_sequence(&path).unwrap(), b"acgtac");
    }

    #[test]
    fn test_load_sequence_malformed_fastq_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "reads.fna", "@r1\nACGT\n+\nII\n");
        assert!(matches!(load_sequence(&path), Err(MotifError::Fasta(_))));
    }

    #[test]
    fn test_load_sequence_empty_file() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "empty.fna", "");
        assert!(load_sequence(&path).unwrap().is_empty());
    }

    #[test]
    fn test_fasta_files_filters_and_sorts() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "b.fna", ">b\nACGT\n");
        write_file(dir.path(), "a.fna", ">a\nACGT\n");
        write_file(dir.path(), "notes.txt", "ignore me");
        fs::create_dir(dir.path().join("sub.fna")).unwrap();

        let files = fasta_files(dir.path(), "fna").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.fna", "b.fna"]);
    }

    #[test]
    fn test_fasta_files_missing_dir() {
        let dir = tempdir().unwrap();
        let err = fasta_files(dir.path().join("nope"), "fna").unwrap_err();
        assert!(matches!(err, MotifError::FileNotFound(_)));
    }

    #[test]
    fn test_composition() {
        let comp = Composition::of(b"aacgtNn");
        assert_eq!(comp, Composition { a: 2, c: 1, g: 1, t: 1, other: 2 });
        assert_eq!(comp.total(), 7);
        assert!((comp.gc_fraction() - 2.0 / 7.0).abs() < 1e-12);
        assert_eq!(Composition::of(b"").gc_fraction(), 0.0);
    }

    #[test]
    fn test_composition_proportions() {
        let comp = Composition::of(b"aacgtNn");
        assert!((comp.proportion(b'A') - 2.0 / 7.0).abs() < 1e-12);
        assert!((comp.proportion(b'c') - 1.0 / 7.0).abs() < 1e-12);
        assert!((comp.proportion(b'x') - 2.0 / 7.0).abs() < 1e-12);
        assert!((comp.percent(b'g') - 100.0 / 7.0).abs() < 1e-9);
        assert_eq!(Composition::of(b"").proportion(b'A'), 0.0);
    }

    #[test]
    fn test_expected_proportion_is_product_of_base_shares() {
        let comp = Composition::of(b"aaccggtt");
        let expected = comp.expected_proportion(b"ACGTACGT");
        assert!((expected - 0.25f64.powi(8)).abs() < 1e-15);
        assert_eq!(Composition::of(b"aaaa").expected_proportion(b"AA"), 1.0);
        assert_eq!(comp.expected_proportion(b"NN"), 0.0);
        // an empty motif is certain
        assert_eq!(comp.expected_proportion(b""), 1.0);
    }
}
