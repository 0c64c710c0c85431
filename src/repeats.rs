use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter},
    path::Path,
};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::{REPEAT_CHROM_COL, REPEAT_END_COL, REPEAT_START_COL};
use crate::{Error, ErrorKind, Result};

/// A genomic range known to hold repetitive sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "(u64, u64)")]
pub struct RepeatInterval {
    pub start: u64,
    pub end: u64,
}

impl RepeatInterval {
    pub fn new(start: u64, end: u64) -> Self {
        RepeatInterval { start, end }
    }

    /// True when either bound of the hit falls strictly inside this interval.
    ///
    /// Only the endpoints are tested: a hit spanning the whole interval is
    /// not reported.
    #[inline(always)]
    pub fn holds_bound(&self, low: u64, high: u64) -> bool {
        (self.start < low && low < self.end) || (self.start > high && high > self.end)
    }
}

impl From<RepeatInterval> for (u64, u64) {
    fn from(interval: RepeatInterval) -> Self {
        (interval.start, interval.end)
    }
}

impl<'de> Deserialize<'de> for RepeatInterval {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let (start, end) = <(Coord, Coord)>::deserialize(deserializer)?;
        Ok(RepeatInterval::new(start.0, end.0))
    }
}

/// A coordinate stored either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Copy)]
struct Coord(u64);

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(Coord(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<u64>()
                .map(Coord)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Repeat intervals per chromosome, each list ascending by start.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepeatIndex {
    chroms: HashMap<String, Vec<RepeatInterval>>,
}

impl RepeatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a tab-separated repeat table. The first row is a
    /// header; chromosome, start and end are read at fixed column offsets.
    pub fn from_table<R: io::Read>(rdr: R) -> Result<Self> {
        let mut index = RepeatIndex::new();

        for (n, line) in BufReader::new(rdr).lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = n as u64 + 1;
            let fields = line.split('\t').collect::<Vec<&str>>();

            let (chrom, start, end) = match (
                fields.get(REPEAT_CHROM_COL),
                fields.get(REPEAT_START_COL),
                fields.get(REPEAT_END_COL),
            ) {
                (Some(&chrom), Some(&start), Some(&end)) => (chrom, start, end),
                _ => {
                    return Err(Error::new(ErrorKind::MalformedTabularRow {
                        line: line_no,
                        msg: format!(
                            "expected at least {} columns, found {}",
                            REPEAT_END_COL + 1,
                            fields.len()
                        ),
                    }))
                }
            };

            let coord = |field: &str| {
                field.trim().parse::<u64>().map_err(|e| {
                    Error::new(ErrorKind::MalformedTabularRow {
                        line: line_no,
                        msg: format!("{:?} is not a coordinate - {}", field, e),
                    })
                })
            };

            index
                .chroms
                .entry(chrom.to_string())
                .or_default()
                .push(RepeatInterval::new(coord(start)?, coord(end)?));
        }

        index.sort();
        Ok(index)
    }

    pub fn from_table_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_table(File::open(path)?)
    }

    /// Load a persisted index. Lists are re-sorted whatever their stored order.
    pub fn from_json<R: io::Read>(rdr: R) -> Result<Self> {
        let chroms: HashMap<String, Vec<RepeatInterval>> =
            serde_json::from_reader(BufReader::new(rdr))?;
        let mut index = RepeatIndex { chroms };
        index.sort();
        Ok(index)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(File::open(path)?)
    }

    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<()> {
        let ordered = self.chroms.iter().collect::<BTreeMap<_, _>>();
        serde_json::to_writer_pretty(writer, &ordered)?;
        Ok(())
    }

    pub fn write_json_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_json(BufWriter::new(File::create(path)?))
    }

    pub fn insert(&mut self, chrom: &str, interval: RepeatInterval) {
        let list = self.chroms.entry(chrom.to_string()).or_default();
        let at = list.partition_point(|i| i.start <= interval.start);
        list.insert(at, interval);
    }

    pub fn get(&self, chrom: &str) -> Option<&[RepeatInterval]> {
        self.chroms.get(chrom).map(Vec::as_slice)
    }

    pub fn num_chroms(&self) -> usize {
        self.chroms.len()
    }

    pub fn num_intervals(&self) -> usize {
        self.chroms.values().map(Vec::len).sum()
    }

    /// True when a bound of the hit `[a, b]` (in either order) falls inside
    /// a repeat of `chrom`. Chromosomes without repeats never match.
    pub fn overlaps(&self, chrom: &str, a: u64, b: u64) -> bool {
        match self.chroms.get(chrom) {
            Some(intervals) => search(intervals, a.min(b), a.max(b)).is_some(),
            None => false,
        }
    }

    fn sort(&mut self) {
        for (chrom, intervals) in self.chroms.iter_mut() {
            if intervals.windows(2).any(|w| w[0].start > w[1].start) {
                log::debug!("Re-sorting repeats of {}", chrom);
                intervals.sort_by_key(|i| i.start);
            }
        }
    }
}

/// Binary search over intervals sorted by start: probe the middle, stop on
/// an interval holding a hit bound, otherwise go right when `low` lies past
/// the probe's start and left when it does not.
pub fn search(intervals: &[RepeatInterval], low: u64, high: u64) -> Option<usize> {
    let (mut lo, mut hi) = (0, intervals.len());

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let candidate = &intervals[mid];

        if candidate.holds_bound(low, high) {
            return Some(mid);
        }

        if low > candidate.start {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
#bin\tswScore\tmilliDiv\tmilliDel\tmilliIns\tgenoName\tgenoStart\tgenoEnd\tstrand
585\t463\t13\t6\t17\tchr1\t30000\t30500\t+
585\t3612\t114\t270\t13\tchr1\t10000\t10468\t+
585\t484\t251\t0\t0\tchr2\t500\t700\t-
";

    fn linear(intervals: &[RepeatInterval], low: u64, high: u64) -> bool {
        intervals.iter().any(|i| i.holds_bound(low, high))
    }

    #[test]
    fn table_is_sorted_on_load() {
        let index = RepeatIndex::from_table(TABLE.as_bytes()).unwrap();
        assert_eq!(index.num_chroms(), 2);
        assert_eq!(
            index.get("chr1").unwrap(),
            &[
                RepeatInterval::new(10000, 10468),
                RepeatInterval::new(30000, 30500)
            ]
        );
    }

    #[test]
    fn short_row_is_malformed() {
        let table = format!("{}chr3\t1\t2\n", TABLE);
        let err = RepeatIndex::from_table(table.as_bytes()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedTabularRow { line: 5, .. }
        ));
    }

    #[test]
    fn non_numeric_coordinate_is_malformed() {
        let table = TABLE.replace("30500", "3O500");
        let err = RepeatIndex::from_table(table.as_bytes()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedTabularRow { line: 2, .. }
        ));
    }

    #[test]
    fn json_round_trip_keeps_order_and_pairs() {
        let index = RepeatIndex::from_table(TABLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        index.write_json(&mut buf).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["chr1"], serde_json::json!([[10000, 10468], [30000, 30500]]));

        assert_eq!(RepeatIndex::from_json(buf.as_slice()).unwrap(), index);
    }

    #[test]
    fn unsorted_json_with_string_coordinates_is_repaired() {
        let json = r#"{"chr7": [["900", "950"], ["100", "200"], [400, 420]]}"#;
        let index = RepeatIndex::from_json(json.as_bytes()).unwrap();
        let starts = index
            .get("chr7")
            .unwrap()
            .iter()
            .map(|i| i.start)
            .collect::<Vec<_>>();
        assert_eq!(starts, vec![100, 400, 900]);
    }

    #[test]
    fn overlap_uses_strict_bound_containment() {
        let index = RepeatIndex::from_table(TABLE.as_bytes()).unwrap();

        assert!(index.overlaps("chr1", 10100, 10200));
        // subject coordinates may come reversed
        assert!(index.overlaps("chr1", 30600, 30400));
        // touching a bound is not inside it
        assert!(!index.overlaps("chr1", 10000, 10050));
        // a hit swallowing the whole repeat is not detected
        assert!(!index.overlaps("chr2", 100, 900));
        assert!(!index.overlaps("chrX", 10100, 10200));
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut index = RepeatIndex::new();
        for start in [50, 10, 30, 20] {
            index.insert("chr1", RepeatInterval::new(start, start + 5));
        }
        let starts = index
            .get("chr1")
            .unwrap()
            .iter()
            .map(|i| i.start)
            .collect::<Vec<_>>();
        assert_eq!(starts, vec![10, 20, 30, 50]);
    }

    #[test]
    fn binary_search_agrees_with_linear_scan() {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next = move |bound: u64| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % bound
        };

        for _ in 0..200 {
            let mut intervals = Vec::new();
            let mut pos = next(50);
            for _ in 0..next(40) {
                let start = pos + 1 + next(30);
                let end = start + 1 + next(60);
                intervals.push(RepeatInterval::new(start, end));
                pos = end;
            }

            for _ in 0..50 {
                let a = next(pos + 100);
                let b = a + next(80);
                assert_eq!(
                    search(&intervals, a, b).is_some(),
                    linear(&intervals, a, b),
                    "intervals {:?} hit {}..{}",
                    intervals,
                    a,
                    b
                );
            }
        }
    }
}
