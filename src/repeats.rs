use std::fmt;

use crate::errors::MotifError;
use crate::matcher::{base_in, find_iter, same_base, Match, MotifPattern};
use crate::sequence::Region;
use crate::tata::Partition;

/// Order in which direct-repeat unit lengths are tried at a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum UnitOrder {
    /// Accept the shortest unit whose copy follows immediately.
    #[default]
    Shortest,
    /// Backtracking-regex order: longest unit first.
    Longest,
}

/// A unit of 2..=6 symbols immediately followed by a copy of itself.
#[derive(Debug, Clone, Copy)]
pub struct DirectRepeat {
    pub min_unit: usize,
    pub max_unit: usize,
    pub order: UnitOrder,
}

impl Default for DirectRepeat {
    fn default() -> Self {
        DirectRepeat {
            min_unit: 2,
            max_unit: 6,
            order: UnitOrder::default(),
        }
    }
}

impl MotifPattern for DirectRepeat {
    fn name(&self) -> &'static str {
        "direct repeat"
    }

    fn match_at(&self, seq: &[u8], pos: usize) -> Option<usize> {
        let repeats = |unit: &usize| {
            let unit = *unit;
            pos + 2 * unit <= seq.len()
                && (0..unit).all(|i| same_base(seq[pos + i], seq[pos + unit + i]))
        };
        let mut units = self.min_unit..=self.max_unit;
        let unit = match self.order {
            UnitOrder::Shortest => units.find(repeats),
            UnitOrder::Longest => units.rev().find(repeats),
        }?;
        Some(2 * unit)
    }
}

/// Six symbols reading the same in both directions, `xyzzyx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorRepeat;

pub const MIRROR_LEN: usize = 6;

impl MotifPattern for MirrorRepeat {
    fn name(&self) -> &'static str {
        "mirror repeat"
    }

    fn match_at(&self, seq: &[u8], pos: usize) -> Option<usize> {
        let w = seq.get(pos..pos + MIRROR_LEN)?;
        let half = MIRROR_LEN / 2;
        (0..half)
            .all(|i| same_base(w[i], w[MIRROR_LEN - 1 - i]))
            .then_some(MIRROR_LEN)
    }
}

/// One to `max_units` consecutive `[AT][AT]` pairs, longest run preferred.
#[derive(Debug, Clone, Copy)]
pub struct AtRun {
    pub max_units: usize,
}

impl Default for AtRun {
    fn default() -> Self {
        AtRun { max_units: 8 }
    }
}

impl MotifPattern for AtRun {
    fn name(&self) -> &'static str {
        "AT run"
    }

    fn match_at(&self, seq: &[u8], pos: usize) -> Option<usize> {
        let run = seq
            .get(pos..)?
            .iter()
            .take(2 * self.max_units)
            .take_while(|&&b| base_in(b, b"AT"))
            .count();
        let units = run / 2;
        (units > 0).then_some(2 * units)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatFamily {
    Direct,
    Mirror,
    AtRun,
}

impl RepeatFamily {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            RepeatFamily::Direct => "DR",
            RepeatFamily::Mirror => "MR",
            RepeatFamily::AtRun => "AT/TA/AA/TT runs",
        }
    }
}

impl fmt::Display for RepeatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepeatFamily::Direct => "Direct Repeats",
            RepeatFamily::Mirror => "Mirror Repeats",
            RepeatFamily::AtRun => "AT/TA/AA/TT runs",
        };
        f.write_str(name)
    }
}

/// Matches of one family over one region plus the share of the region they cover.
///
/// Coverage sums match lengths as reported, so overlapping spans would count
/// twice; a single non-overlapping scan never produces them.
#[derive(Debug, Clone)]
pub struct RepeatReport<'a> {
    pub family: RepeatFamily,
    pub matches: Vec<Match<'a>>,
    pub coverage_percent: f64,
}

impl<'a> RepeatReport<'a> {
    fn new(family: RepeatFamily, matches: Vec<Match<'a>>, region_len: usize) -> Self {
        let mut report = RepeatReport {
            family,
            matches,
            coverage_percent: 0.0,
        };
        if region_len > 0 {
            report.coverage_percent = report.covered() as f64 / region_len as f64 * 100.0;
        }
        report
    }

    /// Total length of all matches.
    pub fn covered(&self) -> usize {
        self.matches.iter().map(Match::len).sum()
    }
}

/// Scan `region` with one pattern. An empty region yields no matches and 0% coverage.
pub fn scan_region<'a, P: MotifPattern + ?Sized>(
    family: RepeatFamily,
    pattern: &P,
    region: &'a [u8],
) -> RepeatReport<'a> {
    let matches: Vec<Match<'a>> = match find_iter(pattern, region) {
        Ok(iter) => iter.collect(),
        Err(_) => {
            log::debug!("{} scan skipped: {}", pattern.name(), MotifError::EmptyRegion);
            Vec::new()
        }
    };
    RepeatReport::new(family, matches, region.len())
}

/// The three repeat families scanned over an upstream region.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatScanner {
    pub direct: DirectRepeat,
    pub mirror: MirrorRepeat,
    pub at_run: AtRun,
}

/// Upstream region of a partition with its repeat reports.
#[derive(Debug, Clone)]
pub struct UpstreamReport<'a> {
    pub region: Region,
    pub text: &'a [u8],
    pub upstream_percent: f64,
    pub direct: RepeatReport<'a>,
    pub mirror: RepeatReport<'a>,
    pub at_runs: RepeatReport<'a>,
}

impl<'a> UpstreamReport<'a> {
    pub fn reports(&self) -> [&RepeatReport<'a>; 3] {
        [&self.direct, &self.mirror, &self.at_runs]
    }
}

impl RepeatScanner {
    pub fn with_unit_order(order: UnitOrder) -> Self {
        RepeatScanner {
            direct: DirectRepeat {
                order,
                ..DirectRepeat::default()
            },
            ..RepeatScanner::default()
        }
    }

    /// Run each family independently over `region`.
    pub fn scan<'a>(&self, region: &'a [u8]) -> [RepeatReport<'a>; 3] {
        [
            scan_region(RepeatFamily::Direct, &self.direct, region),
            scan_region(RepeatFamily::Mirror, &self.mirror, region),
            scan_region(RepeatFamily::AtRun, &self.at_run, region),
        ]
    }

    /// Scan the upstream region of `partition`, or `None` when there is no upstream.
    pub fn scan_upstream<'a>(&self, seq: &'a [u8], partition: &Partition) -> Option<UpstreamReport<'a>> {
        let region = partition.upstream?;
        let text = region.slice(seq);
        let [direct, mirror, at_runs] = self.scan(text);
        Some(UpstreamReport {
            region,
            text,
            upstream_percent: partition.upstream_percent,
            direct,
            mirror,
            at_runs,
        })
    }
}
