//! Tabular (12 column) alignment hits and the repeat filter applied to them.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::config::{ALIGNMENT_FIELDS, FIVE_PRIME_LTR, FLANK, FLUSH_BATCH, MAX_SHORT_CHROM};
use crate::{Error, ErrorKind, RepeatIndex, Result, Strand, Terminus};

/// One row of tabular alignment output.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentHit {
    /// `source_file_id.read_id.terminus.strand`
    pub query_id: String,
    /// Subject chromosome, normalised to the repeat index naming
    pub chromosome: String,
    pub percent_id: f64,
    pub alignment_length: u64,
    pub mismatches: u64,
    pub gap_opens: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    pub evalue: f64,
    pub bitscore: f64,
    // raw text of the float columns, re-emitted untouched
    raw: [String; 3],
}

impl AlignmentHit {
    /// Parse one tab-separated row. Any structural problem is reported as a
    /// `MalformedTabularRow` at `line`.
    pub fn from_row(row: &str, line: u64) -> Result<Self> {
        let malformed = |msg: String| Error::new(ErrorKind::MalformedTabularRow { line, msg });

        let fields = row.trim_end().split('\t').collect::<Vec<&str>>();
        if let &[query_id, chromosome, percent_id, alignment_length, mismatches, gap_opens, query_start, query_end, subject_start, subject_end, evalue, bitscore] =
            &fields[..]
        {
            let int = |field: &str| {
                field
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| malformed(format!("{:?} - {}", field, e)))
            };
            let float = |field: &str| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| malformed(format!("{:?} - {}", field, e)))
            };

            Ok(AlignmentHit {
                query_id: query_id.to_string(),
                chromosome: normalize_chromosome(chromosome),
                percent_id: float(percent_id)?,
                alignment_length: int(alignment_length)?,
                mismatches: int(mismatches)?,
                gap_opens: int(gap_opens)?,
                query_start: int(query_start)?,
                query_end: int(query_end)?,
                subject_start: int(subject_start)?,
                subject_end: int(subject_end)?,
                evalue: float(evalue)?,
                bitscore: float(bitscore)?,
                raw: [
                    percent_id.to_string(),
                    evalue.to_string(),
                    bitscore.to_string(),
                ],
            })
        } else {
            Err(malformed(format!(
                "expected {} columns, found {}",
                ALIGNMENT_FIELDS,
                fields.len()
            )))
        }
    }

    /// Terminus and strand encoded at the end of the query id.
    pub fn query_tag(&self) -> Result<(Terminus, Strand)> {
        let invalid = || {
            Error::new(ErrorKind::InvalidStrandTerminusCombination(format!(
                "query {} carries no terminus/strand suffix",
                self.query_id
            )))
        };

        let mut parts = self.query_id.rsplit('.');
        let strand = parts.next().ok_or_else(invalid)?;
        let terminus = parts.next().ok_or_else(invalid)?;

        Ok((terminus.parse::<Terminus>()?, Strand::from_name(strand)?))
    }

    /// Check the query coordinates against the part of the query that holds
    /// the flank.
    pub fn validate(&self) -> Result<()> {
        let (terminus, strand) = self.query_tag()?;
        let (lo, hi) = expected_query_range(strand, terminus);
        let (start, end) = (
            self.query_start.min(self.query_end),
            self.query_start.max(self.query_end),
        );

        if start < lo || end > hi {
            return Err(Error::new(ErrorKind::QueryRange(format!(
                "query {} aligned {}..{}, expected within {}..{}",
                self.query_id, start, end, lo, hi
            ))));
        }
        Ok(())
    }

    /// Subject coordinates in ascending order.
    pub fn subject_bounds(&self) -> (u64, u64) {
        (
            self.subject_start.min(self.subject_end),
            self.subject_start.max(self.subject_end),
        )
    }
}

impl fmt::Display for AlignmentHit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_id,
            self.chromosome,
            self.raw[0],
            self.alignment_length,
            self.mismatches,
            self.gap_opens,
            self.query_start,
            self.query_end,
            self.subject_start,
            self.subject_end,
            self.raw[1],
            self.raw[2]
        )
    }
}

/// Short numeric or sex chromosome names get the `chr` prefix used by the
/// repeat index; longer names (scaffolds, contigs) are left alone.
pub fn normalize_chromosome(name: &str) -> String {
    if name.len() <= MAX_SHORT_CHROM {
        format!("chr{}", name)
    } else {
        name.to_string()
    }
}

/// 1-indexed inclusive query range the flank occupies in the assembled
/// sequence: first when the flank precedes the motif, after the motif
/// otherwise.
pub fn expected_query_range(strand: Strand, terminus: Terminus) -> (u64, u64) {
    let flank = FLANK as u64;
    let motif = FIVE_PRIME_LTR.len() as u64;
    match (strand, terminus) {
        (Strand::Forward, Terminus::FivePrime) | (Strand::Reverse, Terminus::ThreePrime) => {
            (1, flank)
        }
        (Strand::Forward, Terminus::ThreePrime) | (Strand::Reverse, Terminus::FivePrime) => {
            (motif + 1, motif + flank)
        }
    }
}

/// Counts from one filtering pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub read: usize,
    pub invalid: usize,
    pub in_repeats: usize,
    pub written: usize,
}

/// Stream alignment rows from `rdr` and write the ones outside repeats to
/// `writer`, flushing every `FLUSH_BATCH` rows. A malformed row aborts the
/// pass; hits failing validation are logged and dropped.
pub fn filter_hits<R: io::Read, W: Write>(
    rdr: R,
    writer: W,
    repeats: &RepeatIndex,
) -> Result<FilterStats> {
    let mut stats = FilterStats::default();
    let mut writer = writer;
    let mut batch: Vec<AlignmentHit> = Vec::with_capacity(FLUSH_BATCH);

    for (n, row) in BufReader::new(rdr).lines().enumerate() {
        let row = row?;
        if row.trim().is_empty() || row.starts_with('#') {
            continue;
        }

        let hit = AlignmentHit::from_row(&row, n as u64 + 1)?;
        stats.read += 1;

        if let Err(e) = hit.validate() {
            log::warn!("Dropping hit: {}", e);
            stats.invalid += 1;
            continue;
        }

        let (low, high) = hit.subject_bounds();
        if repeats.overlaps(&hit.chromosome, low, high) {
            log::debug!(
                "{} falls in a repeat of {} at {}..{}",
                hit.query_id,
                hit.chromosome,
                low,
                high
            );
            stats.in_repeats += 1;
            continue;
        }

        batch.push(hit);
        if batch.len() >= FLUSH_BATCH {
            stats.written += flush(&mut batch, &mut writer)?;
        }
    }

    stats.written += flush(&mut batch, &mut writer)?;
    Ok(stats)
}

/// Path-based wrapper around [`filter_hits`].
pub fn filter_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    repeats: &RepeatIndex,
) -> Result<FilterStats> {
    let rdr = File::open(input)?;
    let writer = BufWriter::new(File::create(output)?);
    filter_hits(rdr, writer, repeats)
}

fn flush<W: Write>(batch: &mut Vec<AlignmentHit>, writer: &mut W) -> Result<usize> {
    let n = batch.len();
    for hit in batch.drain(..) {
        writeln!(writer, "{}", hit)?;
    }
    writer.flush()?;
    Ok(n)
}
