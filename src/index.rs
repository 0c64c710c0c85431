use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{read_key, ExtractionWindow, HitEntry, Report, Result};

/// Per-file hit index: `source_file_id -> composite_id -> HitEntry`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitIndex(BTreeMap<String, BTreeMap<String, HitEntry>>);

/// Counts from turning reports into index entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub accepted: usize,
    pub rejected: usize,
}

impl HitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(source_id: &str, entries: BTreeMap<String, HitEntry>) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(source_id.to_string(), entries);
        HitIndex(sources)
    }

    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(rdr))?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn write<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.0)?;
        Ok(())
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write(BufWriter::new(File::create(path)?))
    }

    /// Window every hit of a report and keep those with enough flank.
    pub fn insert_report(&mut self, source_id: &str, report: &Report) -> WindowStats {
        let mut stats = WindowStats::default();
        let entries = self.0.entry(source_id.to_string()).or_default();

        for (composite_id, hit) in &report.hits {
            match ExtractionWindow::for_hit(hit) {
                Some(window) => {
                    entries.insert(composite_id.clone(), HitEntry::new(hit, &window));
                    stats.accepted += 1;
                }
                None => {
                    log::debug!("{}: {} lacks flanking sequence", source_id, composite_id);
                    stats.rejected += 1;
                }
            }
        }

        stats
    }

    /// Fold another index into this one; later entries replace earlier ones.
    pub fn merge(&mut self, other: HitIndex) {
        for (source_id, entries) in other.0 {
            self.0.entry(source_id).or_default().extend(entries);
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn entries(&self, source_id: &str) -> Option<&BTreeMap<String, HitEntry>> {
        self.0.get(source_id)
    }

    pub fn entries_mut(&mut self, source_id: &str) -> Option<&mut BTreeMap<String, HitEntry>> {
        self.0.get_mut(source_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, HitEntry>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

/// Composite ids of a source ordered by numeric read key, the order the
/// reads cursor needs.
pub fn sorted_read_ids(entries: &BTreeMap<String, HitEntry>) -> Vec<String> {
    let mut ids = entries.keys().cloned().collect::<Vec<String>>();
    ids.sort_by_cached_key(|id| {
        let read_id = id.rsplit_once('.').map(|(r, _)| r).unwrap_or(id.as_str());
        (read_key(read_id).parse::<u64>().ok(), id.clone())
    });
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hit, Strand, Terminus};

    fn report(terminus: Terminus, hits: &[(&str, usize)]) -> Report {
        let hits = hits
            .iter()
            .map(|(id, start)| {
                let hit = Hit {
                    read_id: id.to_string(),
                    terminus,
                    strand: Strand::Forward,
                    read_length: 200,
                    motif_start: *start,
                    motif_end: start + 19,
                    mismatch: 1,
                };
                (hit.composite_id(), hit)
            })
            .collect();
        Report { terminus, hits }
    }

    #[test]
    fn insert_report_drops_hits_without_flank() {
        let mut index = HitIndex::new();
        let stats = index.insert_report(
            "ERR1_1",
            &report(Terminus::FivePrime, &[("3", 60), ("9", 5)]),
        );

        assert_eq!(stats, WindowStats { accepted: 1, rejected: 1 });
        let entries = index.entries("ERR1_1").unwrap();
        assert_eq!(entries["3.5_prime"].seq_from, 10);
        assert_eq!(entries["3.5_prime"].seq_to, 60);
    }

    #[test]
    fn both_termini_share_a_source() {
        let mut index = HitIndex::new();
        index.insert_report("ERR1_1", &report(Terminus::FivePrime, &[("3", 60)]));
        index.insert_report("ERR1_1", &report(Terminus::ThreePrime, &[("3", 60)]));
        assert_eq!(index.entries("ERR1_1").unwrap().len(), 2);
    }

    #[test]
    fn json_round_trip() {
        let mut index = HitIndex::new();
        index.insert_report("ERR1_1", &report(Terminus::ThreePrime, &[("12", 60)]));

        let mut buf = Vec::new();
        index.write(&mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["ERR1_1"]["12.3_prime"]["prime"], "3_prime");
        assert_eq!(json["ERR1_1"]["12.3_prime"]["seq_from"], 79);

        assert_eq!(HitIndex::from_reader(buf.as_slice()).unwrap(), index);
    }

    #[test]
    fn read_ids_sort_numerically() {
        let mut index = HitIndex::new();
        index.insert_report(
            "s",
            &report(Terminus::FivePrime, &[("100", 60), ("9", 60), ("25", 60)]),
        );
        let ids = sorted_read_ids(index.entries("s").unwrap());
        assert_eq!(ids, vec!["9.5_prime", "25.5_prime", "100.5_prime"]);
    }
}
