use std::io;

use crate::config::FLANK;
use crate::index::sorted_read_ids;
use crate::window::Side;
use crate::{
    read_key, Error, ErrorKind, ExtractionWindow, Hit, HitEntry, HitIndex, ReadsCursor, Result,
    SequenceRecord, Strand, Terminus,
};

/// Join the motif literal and its flank in reading order.
pub fn concat_ltr_flank(strand: Strand, terminus: Terminus, ltr: &str, flank: &str) -> String {
    match Side::of(strand, terminus) {
        Side::Upstream => format!("{}{}", flank, ltr),
        Side::Downstream => format!("{}{}", ltr, flank),
    }
}

/// Cut the motif literal and the flank out of a read.
///
/// Returns `(ltr, flank)`. Fails when the read is empty or too short to
/// hold the requested coordinates.
pub fn extract_sequence(
    window: &ExtractionWindow,
    hit: &Hit,
    sequence: &str,
) -> Result<(String, String)> {
    let corrupt = || {
        Error::new(ErrorKind::MissingOrCorruptSequence(format!(
            "read {} does not cover {}..{}",
            hit.read_id, window.seq_from, window.seq_to
        )))
    };

    if sequence.is_empty() || hit.motif_start == 0 || window.seq_from == 0 {
        return Err(corrupt());
    }

    let side = Side::of(hit.strand, hit.terminus);
    let ltr = sequence
        .get(hit.motif_start - 1..hit.motif_end)
        .ok_or_else(corrupt)?;
    let flank = sequence
        .get(window.flank_range(side))
        .ok_or_else(corrupt)?;

    Ok((ltr.to_string(), flank.to_string()))
}

/// Build the final record for a hit, applying the exact-width acceptance
/// filter. `Ok(None)` means the hit was valid but its flank is not `FLANK`
/// bases wide.
pub fn extract_record(
    source_id: &str,
    hit: &Hit,
    window: &ExtractionWindow,
    sequence: &str,
) -> Result<Option<SequenceRecord>> {
    let (ltr, flank) = extract_sequence(window, hit, sequence)?;
    Ok(record_for(
        source_id,
        &hit.composite_id(),
        hit.strand,
        hit.terminus,
        window,
        &ltr,
        &flank,
    ))
}

/// The record for a filled index entry, if it passes the acceptance filter.
pub fn record_from_entry(
    source_id: &str,
    composite_id: &str,
    entry: &HitEntry,
) -> Option<SequenceRecord> {
    record_for(
        source_id,
        composite_id,
        entry.strand,
        entry.prime,
        &entry.window(),
        &entry.ltr_sequence,
        &entry.extracted_sequence,
    )
}

fn record_for(
    source_id: &str,
    composite_id: &str,
    strand: Strand,
    terminus: Terminus,
    window: &ExtractionWindow,
    ltr: &str,
    flank: &str,
) -> Option<SequenceRecord> {
    if window.width() != FLANK || flank.is_empty() {
        return None;
    }

    Some(SequenceRecord::new(
        source_id,
        composite_id,
        strand,
        concat_ltr_flank(strand, terminus, ltr, flank),
    ))
}

/// Counts from filling an index with read sequences.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub filled: usize,
    pub missing: usize,
}

/// Fill `extracted_sequence` and `LTR_sequence` of every entry of `source_id`
/// from its reads file. Reads that cannot be found or are corrupt are
/// logged and left empty.
pub fn fill_source<R: io::Read>(
    index: &mut HitIndex,
    source_id: &str,
    mut reads: ReadsCursor<R>,
) -> Result<ExtractStats> {
    let mut stats = ExtractStats::default();
    let entries = match index.entries_mut(source_id) {
        Some(entries) => entries,
        None => return Ok(stats),
    };

    for composite_id in sorted_read_ids(entries) {
        let entry = match entries.get_mut(&composite_id) {
            Some(entry) => entry,
            None => continue,
        };
        let hit = entry.to_hit(&composite_id);

        let found = match reads.find(read_key(&hit.read_id))? {
            Some(sequence) => extract_sequence(&entry.window(), &hit, &sequence),
            None => Err(Error::new(ErrorKind::MissingOrCorruptSequence(format!(
                "read {} not found",
                hit.read_id
            )))),
        };

        match found {
            Ok((ltr, flank)) => {
                entry.ltr_sequence = ltr;
                entry.extracted_sequence = flank;
                stats.filled += 1;
            }
            Err(e) => {
                log::warn!("{}: {}", source_id, e);
                stats.missing += 1;
            }
        }
    }

    Ok(stats)
}
