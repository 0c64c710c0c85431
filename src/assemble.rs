use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::extract::record_from_entry;
use crate::{HitIndex, Result, SequenceRecord};

/// Ordered collection of final sequences gathered across hit indexes.
#[derive(Debug, Default)]
pub struct Assembler {
    records: Vec<SequenceRecord>,
    skipped: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every accepted record of an index, source by source. Records
    /// from different sources are never deduplicated.
    pub fn add_index(&mut self, index: &HitIndex) {
        for (source_id, entries) in index.iter() {
            for (composite_id, entry) in entries {
                match record_from_entry(source_id, composite_id, entry) {
                    Some(record) => self.records.push(record),
                    None => self.skipped += 1,
                }
            }
        }
    }

    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    /// Entries left out by the exact-width and non-empty filter.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = writer;
        for record in &self.records {
            writeln!(writer, ">{}", record.id)?;
            writeln!(writer, "{}", record.sequence)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        log::info!(
            "Writing {} sequences to {}",
            self.records.len(),
            path.as_ref().display()
        );
        self.write(BufWriter::new(File::create(path)?))
    }
}

/// Convenience for a single pass: assemble a list of indexes into a writer.
pub fn assemble<W: io::Write>(indexes: &[HitIndex], writer: W) -> Result<Assembler> {
    let mut assembler = Assembler::new();
    for index in indexes {
        assembler.add_index(index);
    }
    assembler.write(writer)?;
    Ok(assembler)
}
