use crate::errors::{MotifError, Result};
use crate::matcher::{base_in, find_first, same_base, MotifPattern};
use crate::sequence::Region;

pub const TATA_BOX_LEN: usize = 8;

/// `TATA[AT]A[AT][AG]`
pub struct TataBox;

impl MotifPattern for TataBox {
    fn name(&self) -> &'static str {
        "TATA-box"
    }

    fn match_at(&self, seq: &[u8], pos: usize) -> Option<usize> {
        let w = seq.get(pos..pos + TATA_BOX_LEN)?;
        let hit = w[..4].iter().zip(b"TATA").all(|(&a, &b)| same_base(a, b))
            && base_in(w[4], b"AT")
            && same_base(w[5], b'A')
            && base_in(w[6], b"AT")
            && base_in(w[7], b"AG");
        hit.then_some(TATA_BOX_LEN)
    }
}

/// The sequence split around its first TATA-box.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub seq_len: usize,
    pub upstream: Option<Region>,
    pub tata_box: Region,
    pub downstream: Option<Region>,
    /// Upstream length as a percentage of the whole sequence.
    pub upstream_percent: f64,
}

impl Partition {
    fn around(tata_box: Region, seq_len: usize) -> Self {
        let upstream = Some(Region::new(0, tata_box.start)).filter(|r| !r.is_empty());
        let downstream = Some(Region::new(tata_box.end, seq_len)).filter(|r| !r.is_empty());
        let upstream_percent = match upstream {
            Some(region) => region.len() as f64 / seq_len as f64 * 100.0,
            None => 0.0,
        };
        Partition {
            seq_len,
            upstream,
            tata_box,
            downstream,
            upstream_percent,
        }
    }
}

/// Find the first TATA-box and partition the sequence around it.
///
/// An empty sequence, or one without a TATA-box, yields
/// [`MotifError::NoMotifFound`].
pub fn locate(seq: &[u8]) -> Result<Partition> {
    if seq.is_empty() {
        return Err(MotifError::NoMotifFound);
    }
    let hit = find_first(&TataBox, seq).ok_or(MotifError::NoMotifFound)?;
    log::debug!("TATA-box {} at {}", hit.as_str(), hit.region);
    Ok(Partition::around(hit.region, seq.len()))
}

/// Copy of `seq` with `region` upper-cased, for display only.
pub fn highlight(seq: &[u8], region: Region) -> String {
    seq.iter()
        .enumerate()
        .map(|(i, &b)| {
            if i >= region.start && i < region.end {
                b.to_ascii_uppercase() as char
            } else {
                b as char
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_empty_sequence() {
        assert!(matches!(locate(b""), Err(MotifError::NoMotifFound)));
    }

    #[test]
    fn test_locate_without_tata_box() {
        assert!(matches!(locate(b"ggggcccctatg"), Err(MotifError::NoMotifFound)));
        // TATA followed by a G at the fifth position is not a TATA-box
        assert!(matches!(locate(b"tatagaaa"), Err(MotifError::NoMotifFound)));
    }

    #[test]
    fn test_locate_at_sequence_start_has_no_upstream() {
        let part = locate(b"tataaaagcc").unwrap();
        assert_eq!(part.tata_box, Region::new(0, 8));
        assert_eq!(part.upstream, None);
        assert_eq!(part.downstream, Some(Region::new(8, 10)));
        assert_eq!(part.upstream_percent, 0.0);
    }

    #[test]
    fn test_locate_at_sequence_end_has_no_downstream() {
        let part = locate(b"cctatatata").unwrap();
        assert_eq!(part.tata_box, Region::new(2, 10));
        assert_eq!(part.upstream, Some(Region::new(0, 2)));
        assert_eq!(part.downstream, None);
    }

    #[test]
    fn test_locate_end_to_end_example() {
        let seq = b"ggggtataaaagcccc";
        let part = locate(seq).unwrap();
        assert_eq!(part.seq_len, 16);
        assert_eq!(part.tata_box, Region::new(4, 12));
        assert_eq!(part.tata_box.slice(seq), b"tataaaag");
        assert_eq!(part.tata_box.to_string(), "[ 5 : 12 ]");

        let upstream = part.upstream.unwrap();
        assert_eq!(upstream.slice(seq), b"gggg");
        assert_eq!(upstream.to_string(), "[ 1 : 4 ]");
        assert_eq!(part.upstream_percent, 25.0);

        let downstream = part.downstream.unwrap();
        assert_eq!(downstream.slice(seq), b"cccc");
        assert_eq!(downstream.to_string(), "[ 13 : 16 ]");
    }

    #[test]
    fn test_locate_reports_first_occurrence_case_insensitively() {
        let part = locate(b"gTATAAATAcctataaaag").unwrap();
        assert_eq!(part.tata_box, Region::new(1, 9));
    }

    #[test]
    fn test_partition_regions_are_contiguous() {
        let seq = b"acgtacgttatataaagtttacg";
        let part = locate(seq).unwrap();
        let up = part.upstream.unwrap();
        let down = part.downstream.unwrap();
        assert_eq!(up.start, 0);
        assert_eq!(up.end, part.tata_box.start);
        assert_eq!(part.tata_box.end, down.start);
        assert_eq!(down.end, seq.len());
    }

    #[test]
    fn test_highlight_uppercases_only_the_box() {
        let seq = b"ggggtataaaagcccc";
        assert_eq!(highlight(seq, Region::new(4, 12)), "ggggTATAAAAGcccc");
        // the source bytes are untouched
        assert_eq!(seq, b"ggggtataaaagcccc");
    }
}
