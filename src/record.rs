use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind, ExtractionWindow, Result};

/// Which end of the retroviral element the scanned motif belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminus {
    #[serde(rename = "5_prime")]
    FivePrime,
    #[serde(rename = "3_prime")]
    ThreePrime,
}

impl Terminus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminus::FivePrime => "5_prime",
            Terminus::ThreePrime => "3_prime",
        }
    }
}

impl fmt::Display for Terminus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terminus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "5_prime" | "five_prime" => Ok(Terminus::FivePrime),
            "3_prime" | "three_prime" => Ok(Terminus::ThreePrime),
            _ => Err(Error::new(ErrorKind::InvalidStrandTerminusCombination(
                format!("{:?} is not a terminus", s),
            ))),
        }
    }
}

/// Genomic strand the motif was matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Parse the scanner's `+`/`-` notation.
    pub fn from_symbol(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(Error::new(ErrorKind::Parser(format!(
                "{:?} is not a strand",
                s
            )))),
        }
    }

    /// Parse the long name used in record identifiers.
    pub fn from_name(s: &str) -> Result<Self> {
        match s {
            "forward" => Ok(Strand::Forward),
            "reverse" => Ok(Strand::Reverse),
            _ => Err(Error::new(ErrorKind::InvalidStrandTerminusCombination(
                format!("{:?} is not a strand name", s),
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strand::Forward => "forward",
            Strand::Reverse => "reverse",
        }
    }
}

/// One motif match on a read, as reported by the motif scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Read identifier as printed in the report
    pub read_id: String,
    pub terminus: Terminus,
    pub strand: Strand,
    pub read_length: usize,
    /// First base of the motif match (1-indexed, inclusive)
    pub motif_start: usize,
    /// Last base of the motif match (1-indexed, inclusive)
    pub motif_end: usize,
    pub mismatch: u32,
}

impl Hit {
    /// `read_id.terminus`, the key of the hit inside a hit index.
    pub fn composite_id(&self) -> String {
        format!("{}.{}", self.read_id, self.terminus)
    }
}

/// The trailing run of digits of a read id, used to match reads file headers.
pub fn read_key(read_id: &str) -> &str {
    let start = read_id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(read_id.len());
    &read_id[start..]
}

/// A hit as stored in the per-file hit index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEntry {
    pub read_length: usize,
    pub prime: Terminus,
    #[serde(rename = "LTR_from")]
    pub ltr_from: usize,
    #[serde(rename = "LTR_to")]
    pub ltr_to: usize,
    pub strand: Strand,
    pub mismatch: u32,
    pub seq_from: usize,
    pub seq_to: usize,
    #[serde(default)]
    pub extracted_sequence: String,
    #[serde(rename = "LTR_sequence", default)]
    pub ltr_sequence: String,
}

impl HitEntry {
    pub fn new(hit: &Hit, window: &ExtractionWindow) -> Self {
        HitEntry {
            read_length: hit.read_length,
            prime: hit.terminus,
            ltr_from: hit.motif_start,
            ltr_to: hit.motif_end,
            strand: hit.strand,
            mismatch: hit.mismatch,
            seq_from: window.seq_from,
            seq_to: window.seq_to,
            extracted_sequence: String::new(),
            ltr_sequence: String::new(),
        }
    }

    /// Rebuild the hit for the composite id this entry is stored under.
    pub fn to_hit(&self, composite_id: &str) -> Hit {
        let read_id = composite_id
            .rsplit_once('.')
            .map(|(id, _)| id)
            .unwrap_or(composite_id);
        Hit {
            read_id: read_id.to_string(),
            terminus: self.prime,
            strand: self.strand,
            read_length: self.read_length,
            motif_start: self.ltr_from,
            motif_end: self.ltr_to,
            mismatch: self.mismatch,
        }
    }

    pub fn window(&self) -> ExtractionWindow {
        ExtractionWindow {
            seq_from: self.seq_from,
            seq_to: self.seq_to,
        }
    }
}

/// A final sequence ready for alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// `source_file_id.composite_id.strand_name`
    pub id: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(source_id: &str, composite_id: &str, strand: Strand, sequence: String) -> Self {
        SequenceRecord {
            id: format!("{}.{}.{}", source_id, composite_id, strand.name()),
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_key_takes_trailing_digits() {
        assert_eq!(read_key("12345"), "12345");
        assert_eq!(read_key("ERR145618_77"), "77");
        assert_eq!(read_key("ERR145618.1234"), "1234");
        assert_eq!(read_key("read"), "");
    }

    #[test]
    fn hit_entry_serialises_with_legacy_keys() {
        let hit = Hit {
            read_id: "42".into(),
            terminus: Terminus::FivePrime,
            strand: Strand::Forward,
            read_length: 200,
            motif_start: 60,
            motif_end: 79,
            mismatch: 1,
        };
        let window = ExtractionWindow {
            seq_from: 10,
            seq_to: 60,
        };
        let entry = HitEntry::new(&hit, &window);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["prime"], "5_prime");
        assert_eq!(json["strand"], "+");
        assert_eq!(json["LTR_from"], 60);
        assert_eq!(json["LTR_sequence"], "");
        assert_eq!(entry.to_hit(&hit.composite_id()), hit);
    }

    #[test]
    fn record_id_joins_source_read_and_strand() {
        let record = SequenceRecord::new("ERR1_1", "42.3_prime", Strand::Reverse, "ACGT".into());
        assert_eq!(record.id, "ERR1_1.42.3_prime.reverse");
    }
}
