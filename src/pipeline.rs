//! Stage drivers shared by the command line tool and the integration tests.
//!
//! Each stage works file-at-a-time: a structural error in one input is
//! logged and that input skipped, the remaining inputs are still processed.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::config::{INDEX_SUFFIX, READS_SUFFIX};
use crate::extract::{fill_source, ExtractStats};
use crate::index::WindowStats;
use crate::{parse_report, HitIndex, ReadsCursor, Reader, Result};

/// Source file id of an input: its file name up to the first `.`.
pub fn source_id<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_name()
        .and_then(|f| f.to_str())
        .and_then(|f| f.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Parse every report and window its hits. Reports of the same source merge
/// into one index entry.
pub fn index_reports(reports: &[PathBuf]) -> (HitIndex, WindowStats) {
    let mut index = HitIndex::new();
    let mut total = WindowStats::default();

    for path in reports {
        let source = source_id(path);
        let report = match Reader::from_path(path).and_then(parse_report) {
            Ok(report) => report,
            Err(e) => {
                warn!("Skipping report {}: {}", path.display(), e);
                continue;
            }
        };

        let stats = index.insert_report(&source, &report);
        info!(
            "{}: {} {} hits, {} with enough flank",
            path.display(),
            report.hits.len(),
            report.terminus,
            stats.accepted
        );
        total.accepted += stats.accepted;
        total.rejected += stats.rejected;
    }

    (index, total)
}

/// Write one `<source>.json` per source of `index` into `outdir`.
pub fn write_per_source(index: &HitIndex, outdir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (source, entries) in index.iter() {
        let single = HitIndex::from_entries(source, entries.clone());
        let path = outdir.join(format!("{}.{}", source, INDEX_SUFFIX));
        single.write_path(&path)?;
        written.push(path);
    }
    Ok(written)
}

/// Fill every source of a hit index from `<fasta_dir>/<source>.FASTA`.
pub fn extract_index(index: &mut HitIndex, fasta_dir: &Path) -> ExtractStats {
    let mut total = ExtractStats::default();
    let sources = index.sources().map(str::to_string).collect::<Vec<String>>();

    for source in sources {
        let fasta = fasta_dir.join(format!("{}.{}", source, READS_SUFFIX));
        let filled = ReadsCursor::from_path(&fasta)
            .and_then(|reads| fill_source(index, &source, reads));

        match filled {
            Ok(stats) => {
                info!(
                    "{}: {} sequences extracted, {} missing",
                    source, stats.filled, stats.missing
                );
                total.filled += stats.filled;
                total.missing += stats.missing;
            }
            Err(e) => error!("Skipping {}: {}", fasta.display(), e),
        }
    }

    total
}

/// Load and merge hit indexes, skipping unreadable ones.
pub fn load_indexes(paths: &[PathBuf]) -> Vec<HitIndex> {
    paths
        .iter()
        .filter_map(|path| match HitIndex::from_path(path) {
            Ok(index) => Some(index),
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
