use std::{
    cmp::Ordering,
    fs::File,
    io::{self, BufRead},
    path::Path,
};

use crate::Result;

/// Forward-only lookup of reads in a single-line FASTA file.
///
/// Headers end in `_<digits>`; the line after a header is the read sequence.
/// Headers are expected in ascending key order and keys must be requested
/// in ascending numeric order. A key lying behind the cursor, or absent from
/// the file, is reported as not found without losing the reads after it.
pub struct ReadsCursor<R> {
    rdr: io::BufReader<R>,
    line: u64,
    last: Option<(String, String)>,
    peeked: Option<String>,
}

impl ReadsCursor<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ReadsCursor<File>> {
        Ok(ReadsCursor::new(File::open(path)?))
    }
}

impl<R: io::Read> ReadsCursor<R> {
    pub fn new(rdr: R) -> ReadsCursor<R> {
        ReadsCursor {
            rdr: io::BufReader::new(rdr),
            line: 0,
            last: None,
            peeked: None,
        }
    }

    /// Advance to the read whose header key equals `key` and return its
    /// sequence. The most recent match is kept so both termini of a read
    /// can be served.
    pub fn find(&mut self, key: &str) -> Result<Option<String>> {
        if let Some((last_key, sequence)) = &self.last {
            if last_key == key {
                return Ok(Some(sequence.clone()));
            }
        }

        let mut temp_buf = String::new();
        loop {
            let header = match self.peeked.take() {
                Some(header) => header,
                None => match self.next_header(&mut temp_buf)? {
                    Some(header) => header,
                    None => return Ok(None),
                },
            };

            match compare_keys(&header, key) {
                Ordering::Less => continue,
                Ordering::Greater => {
                    // keep it for a later, larger key
                    self.peeked = Some(header);
                    return Ok(None);
                }
                Ordering::Equal => {
                    self.line += 1;
                    temp_buf.clear();
                    self.rdr.read_line(&mut temp_buf)?;
                    let sequence = temp_buf.trim_end().to_string();
                    log::debug!("Found read {} at line {}", key, self.line);

                    self.last = Some((key.to_string(), sequence.clone()));
                    return Ok(Some(sequence));
                }
            }
        }
    }

    /// Key of the next header line, or `None` at the end of the input.
    fn next_header(&mut self, temp_buf: &mut String) -> Result<Option<String>> {
        loop {
            self.line += 1;
            temp_buf.clear();
            if self.rdr.read_line(temp_buf)? == 0 {
                return Ok(None);
            }

            if temp_buf.starts_with('>') {
                if let Some(key) = header_key(temp_buf) {
                    return Ok(Some(key.to_string()));
                }
            }
        }
    }
}

/// The `_<digits>` suffix of a FASTA header line, without the underscore.
fn header_key(line: &str) -> Option<&str> {
    let (_, key) = line.trim_end().rsplit_once('_')?;
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        Some(key)
    } else {
        None
    }
}

/// Numeric order of two digit strings of any length.
fn compare_keys(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const READS: &str = "\
>ERR145618.1 HWI-ST_1
ACGTACGT
>ERR145618.2 HWI-ST_2
TTTTGGGG
>ERR145618.3 HWI-ST_3

>ERR145618.10 HWI-ST_10
CCCCAAAA
";

    #[test]
    fn finds_reads_in_ascending_order() {
        let mut cursor = ReadsCursor::new(READS.as_bytes());
        assert_eq!(cursor.find("2").unwrap().as_deref(), Some("TTTTGGGG"));
        assert_eq!(cursor.find("2").unwrap().as_deref(), Some("TTTTGGGG"));
        assert_eq!(cursor.find("3").unwrap().as_deref(), Some(""));
        assert_eq!(cursor.find("10").unwrap().as_deref(), Some("CCCCAAAA"));
    }

    #[test]
    fn out_of_order_key_is_not_found() {
        let mut cursor = ReadsCursor::new(READS.as_bytes());
        assert!(cursor.find("10").unwrap().is_some());
        assert!(cursor.find("1").unwrap().is_none());
    }

    #[test]
    fn missing_key_does_not_hide_later_reads() {
        let reads = ">r_1\nAAAA\n>r_3\nCCCC\n>r_5\nGGGG\n";
        let mut cursor = ReadsCursor::new(reads.as_bytes());
        assert_eq!(cursor.find("1").unwrap().as_deref(), Some("AAAA"));
        assert!(cursor.find("2").unwrap().is_none());
        assert!(cursor.find("4").unwrap().is_none());
        assert_eq!(cursor.find("5").unwrap().as_deref(), Some("GGGG"));
        assert!(cursor.find("6").unwrap().is_none());
    }

    #[test]
    fn keys_compare_numerically() {
        assert_eq!(compare_keys("10", "9"), Ordering::Greater);
        assert_eq!(compare_keys("007", "7"), Ordering::Equal);
        assert_eq!(compare_keys("12", "21"), Ordering::Less);
    }

    #[test]
    fn header_key_needs_trailing_digits() {
        assert_eq!(header_key(">read_42\n"), Some("42"));
        assert_eq!(header_key(">read_42a"), None);
        assert_eq!(header_key(">read42"), None);
    }
}
