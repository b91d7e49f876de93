use std::io::{self, Write};

use crate::kmers::FileSignature;
use crate::repeats::{RepeatFamily, RepeatReport, UpstreamReport};
use crate::tata::{highlight, Partition};

const RULE: &str = "---------------------------------------------------------";
const DOUBLE_RULE: &str = "=========================================================";

/// Position ruler `1234567890123...` as long as the sequence.
pub fn index_ruler(len: usize) -> String {
    (1..=len)
        .map(|i| char::from(b'0' + (i % 10) as u8))
        .collect()
}

pub fn write_no_tata_box(out: &mut impl Write, seq_len: usize) -> io::Result<()> {
    if seq_len == 0 {
        writeln!(out, "The sequence is empty; there is no TATA-box to locate.")
    } else {
        writeln!(out, "There is no TATA-box to locate.")
    }
}

/// Sequence with the TATA-box upper-cased, its ruler and the three region ranges.
pub fn write_partition(out: &mut impl Write, seq: &[u8], partition: &Partition) -> io::Result<()> {
    writeln!(out, "\nThe size of the region being searched is {} bp", partition.seq_len)?;
    writeln!(out, "{DOUBLE_RULE}")?;
    writeln!(out, "{}", highlight(seq, partition.tata_box))?;
    writeln!(out, "{}\n", index_ruler(partition.seq_len))?;

    match partition.upstream {
        Some(region) => writeln!(out, "Upstream:   {region}")?,
        None => writeln!(out, "There is no upstream region prior to the TATA-box!")?,
    }
    writeln!(out, "TATA-box:   {}", partition.tata_box)?;
    match partition.downstream {
        Some(region) => writeln!(out, "Downstream: {region}")?,
        None => writeln!(out, "There is no downstream region after the TATA-box!")?,
    }
    writeln!(out, "{RULE}")
}

pub fn write_upstream(out: &mut impl Write, upstream: &UpstreamReport) -> io::Result<()> {
    writeln!(out, "\nUPSTREAM of TATA-box")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{}", String::from_utf8_lossy(upstream.text))?;
    writeln!(out, "{}\n", index_ruler(upstream.text.len()))?;
    writeln!(out, "The size of the upstream region is {} bp", upstream.region.len())?;
    writeln!(
        out,
        "The percentage of upstream region is:{:5.1}%",
        upstream.upstream_percent
    )?;
    writeln!(out, "{RULE}")?;
    for report in upstream.reports() {
        write_repeat_report(out, report)?;
    }
    Ok(())
}

pub fn write_repeat_report(out: &mut impl Write, report: &RepeatReport) -> io::Result<()> {
    let abbrev = report.family.abbreviation();
    writeln!(out, "-Searching for {} in the upstream region-\n", report.family)?;
    if report.matches.is_empty() {
        writeln!(out, "No {abbrev} found.")?;
    }
    for m in &report.matches {
        let label = match report.family {
            RepeatFamily::AtRun => "AT run".to_string(),
            _ => abbrev.to_string(),
        };
        writeln!(out, "Found {label}: {}", m.as_str())?;
        writeln!(out, "     at upstream location: {}", m.region)?;
    }
    writeln!(
        out,
        "\nPercent of {abbrev} in the upstream region is:{:5.1}%",
        report.coverage_percent
    )?;
    writeln!(out, "{RULE}")
}

/// Input files with their length, base composition and, for each ranked
/// motif, the observed proportion next to the one expected from composition.
pub fn write_file_listing(out: &mut impl Write, signatures: &[FileSignature]) -> io::Result<()> {
    for file_sig in signatures {
        let comp = &file_sig.composition;
        writeln!(
            out,
            "{} with DNA length: {} bp",
            file_sig.path.display(),
            file_sig.seq_len
        )?;
        writeln!(
            out,
            "    A {} ({:.2}%)  C {} ({:.2}%)  G {} ({:.2}%)  T {} ({:.2}%)  other {}  GC {:.1}%",
            comp.a,
            comp.percent(b'A'),
            comp.c,
            comp.percent(b'C'),
            comp.g,
            comp.percent(b'G'),
            comp.t,
            comp.percent(b'T'),
            comp.other,
            comp.gc_fraction() * 100.0
        )?;
        for ranked in &file_sig.signature.ranked {
            writeln!(
                out,
                "    {:>3}. {} observed {:.6} expected {:.6}",
                ranked.rank,
                ranked.motif,
                ranked.proportion,
                comp.expected_proportion(ranked.motif.as_bytes())
            )?;
        }
    }
    Ok(())
}
