use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufRead},
    path::Path,
};

use crate::config::{FIVE_PRIME_LTR, THREE_PRIME_LTR};
use crate::{Error, ErrorKind, Hit, Result, Strand, Terminus};

/// Motif-scan report reader. Yields one `Hit` per `# Sequence:` block.
pub struct Reader<R> {
    rdr: io::BufReader<R>,
    line: u64,
    terminus: Option<Terminus>,
    current: Option<RawHit>,
    done: bool,
}

impl Reader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        Ok(Reader::new(File::open(path)?))
    }
}

impl<R: io::Read> Reader<R> {
    pub fn new(rdr: R) -> Reader<R> {
        Reader {
            rdr: io::BufReader::new(rdr),
            line: 0,
            terminus: None,
            current: None,
            done: false,
        }
    }

    /// The terminus named by the report's motif directive, once it has been read.
    pub fn terminus(&self) -> Option<Terminus> {
        self.terminus
    }

    /// A borrowed iterator over the hits of a report.
    pub fn records(&mut self) -> RecordsIter<R> {
        RecordsIter::new(self)
    }

    /// An owned iterator over the hits of a report.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter::new(self)
    }

    /// Read a single hit from the report. A hit is complete once the next
    /// sequence line (or the end of the input) is reached.
    fn read_record(&mut self) -> Result<Option<Hit>> {
        if self.done {
            return Ok(None);
        }

        let mut temp_buf = String::new();

        loop {
            self.line += 1;
            temp_buf.clear();
            let bytes = self.rdr.read_line(&mut temp_buf)?;
            if bytes == 0 {
                self.done = true;
                let terminus = match self.terminus {
                    Some(t) => t,
                    None => {
                        return Err(Error::new(ErrorKind::UnknownMotif(
                            "no -pattern directive found in report".into(),
                        )))
                    }
                };
                return match self.current.take() {
                    Some(raw) => raw.finish(terminus).map(Some),
                    None => Ok(None),
                };
            }

            let parsed = parse_input_line(&temp_buf).map_err(|e| {
                Error::new(ErrorKind::Parser(format!("at line {}, {}", self.line, e)))
            });

            match parsed {
                Ok(Line::Skip) => continue,
                Ok(Line::Directive(motif)) => {
                    // only the first directive names the scanned motif
                    if self.terminus.is_none() {
                        match terminus_for_motif(&motif) {
                            Ok(t) => self.terminus = Some(t),
                            Err(e) => {
                                self.done = true;
                                return Err(e);
                            }
                        }
                    }
                }
                Ok(Line::Sequence { id, length }) => {
                    let terminus = match self.terminus {
                        Some(t) => t,
                        None => {
                            self.done = true;
                            return Err(Error::new(ErrorKind::UnknownMotif(format!(
                                "hit {} at line {} precedes the -pattern directive",
                                id, self.line
                            ))));
                        }
                    };
                    let previous = self.current.replace(RawHit::new(id, length));
                    if let Some(raw) = previous {
                        return raw.finish(terminus).map(Some);
                    }
                }
                Ok(Line::Tag(tag, value)) => {
                    // tags before the first sequence line belong to no hit
                    if let Some(raw) = self.current.as_mut() {
                        raw.apply(tag, value);
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            }
        }
    }
}

/// Map the scanned motif literal onto the LTR terminus it marks.
pub fn terminus_for_motif(motif: &str) -> Result<Terminus> {
    if motif.eq_ignore_ascii_case(FIVE_PRIME_LTR) {
        Ok(Terminus::FivePrime)
    } else if motif.eq_ignore_ascii_case(THREE_PRIME_LTR) {
        Ok(Terminus::ThreePrime)
    } else {
        Err(Error::new(ErrorKind::UnknownMotif(format!(
            "{} is neither the 5' nor the 3' LTR",
            motif
        ))))
    }
}

/// Raw tag values accumulated for one hit. Values are only parsed once the
/// hit is complete, so a bad value invalidates that hit alone.
#[derive(Debug, Default)]
struct RawHit {
    id: String,
    length: usize,
    start: Option<String>,
    end: Option<String>,
    strand: Option<String>,
    mismatch: Option<String>,
}

impl RawHit {
    fn new(id: String, length: usize) -> Self {
        RawHit {
            id,
            length,
            ..Default::default()
        }
    }

    fn apply(&mut self, tag: Tag, value: String) {
        let slot = match tag {
            Tag::Start => &mut self.start,
            Tag::End => &mut self.end,
            Tag::Strand => &mut self.strand,
            Tag::Mismatch => &mut self.mismatch,
        };
        *slot = Some(value);
    }

    fn field<T, F>(&self, tag: Tag, value: &Option<String>, parse: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let value = value.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::MissingField(format!(
                "hit {} has no {:?} tag",
                self.id, tag
            )))
        })?;

        parse(value).map_err(|e| {
            Error::new(ErrorKind::InvalidField(format!(
                "hit {} has {:?} {:?} - {}",
                self.id, tag, value, e
            )))
        })
    }

    fn finish(self, terminus: Terminus) -> Result<Hit> {
        let motif_start = self.field(Tag::Start, &self.start, |v| Ok(v.parse::<usize>()?))?;
        let motif_end = self.field(Tag::End, &self.end, |v| Ok(v.parse::<usize>()?))?;
        let strand = self.field(Tag::Strand, &self.strand, Strand::from_symbol)?;
        let mismatch = self.field(Tag::Mismatch, &self.mismatch, |v| match v {
            // the scanner prints '.' for an exact match
            "." => Ok(0),
            _ => Ok(v.parse::<u32>()?),
        })?;

        Ok(Hit {
            read_id: self.id,
            terminus,
            strand,
            read_length: self.length,
            motif_start,
            motif_end,
            mismatch,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tag {
    Start,
    End,
    Strand,
    Mismatch,
}

#[derive(Debug, PartialEq)]
enum Line {
    Skip,
    Directive(String),
    Sequence { id: String, length: usize },
    Tag(Tag, String),
}

/// Classify a single report line.
fn parse_input_line(input: &str) -> Result<Line> {
    let input = input.trim_end();

    if input.trim().is_empty() {
        return Ok(Line::Skip);
    }

    if let Some(comment) = input.strip_prefix('#') {
        let comment = comment.trim_start();

        if let Some(rest) = comment.strip_prefix("-pattern") {
            return match rest.split_whitespace().next() {
                Some(motif) => Ok(Line::Directive(motif.to_string())),
                None => Ok(Line::Skip),
            };
        }

        if let Some(rest) = comment.strip_prefix("Sequence:") {
            let fields = rest.split_whitespace().collect::<Vec<&str>>();
            if let [id, "from:", _from, "to:", to] = &fields[..] {
                return Ok(Line::Sequence {
                    id: id.to_string(),
                    length: to.parse::<usize>()?,
                });
            }
            return Err(Error::new(ErrorKind::Parser(format!(
                "could not split sequence line {:?}",
                input
            ))));
        }

        return Ok(Line::Skip);
    }

    let (tag, value) = match input.split_once(':') {
        Some((tag, value)) => (tag, value.trim()),
        None => return Ok(Line::Skip),
    };

    let tag = match tag {
        "Start" => Tag::Start,
        "End" => Tag::End,
        "Strand" => Tag::Strand,
        "Mismatch" => Tag::Mismatch,
        _ => return Ok(Line::Skip),
    };

    Ok(Line::Tag(tag, value.to_string()))
}

/// A parsed report: the scanned terminus and every complete hit keyed by
/// its composite id.
#[derive(Debug)]
pub struct Report {
    pub terminus: Terminus,
    pub hits: BTreeMap<String, Hit>,
}

/// Parse a whole report. Hits with missing tags are logged and skipped;
/// an unknown motif or a malformed line fails the report.
pub fn parse_report<R: io::Read>(rdr: Reader<R>) -> Result<Report> {
    let mut hits = BTreeMap::new();
    let mut records = rdr.into_records();

    for record in records.by_ref() {
        match record {
            Ok(hit) => {
                hits.insert(hit.composite_id(), hit);
            }
            Err(e) if e.is_recoverable() => log::warn!("Skipping hit: {}", e),
            Err(e) => return Err(e),
        }
    }

    match records.reader().terminus() {
        Some(terminus) => Ok(Report { terminus, hits }),
        None => Err(Error::new(ErrorKind::UnknownMotif(
            "no -pattern directive found in report".into(),
        ))),
    }
}

/// A borrowed iterator over the hits of a report.
pub struct RecordsIter<'r, R: 'r> {
    /// The underlying reader
    rdr: &'r mut Reader<R>,
}

impl<'r, R: io::Read> RecordsIter<'r, R> {
    fn new(rdr: &'r mut Reader<R>) -> RecordsIter<'r, R> {
        RecordsIter { rdr }
    }

    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        self.rdr
    }
}

impl<'r, R: io::Read> Iterator for RecordsIter<'r, R> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Result<Hit>> {
        self.rdr.read_record().transpose()
    }
}

/// An owned iterator over the hits of a report.
pub struct RecordsIntoIter<R> {
    /// The underlying reader.
    rdr: Reader<R>,
}

impl<R: io::Read> RecordsIntoIter<R> {
    fn new(rdr: Reader<R>) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr }
    }

    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }
}

impl<R: io::Read> Iterator for RecordsIntoIter<R> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Result<Hit>> {
        self.rdr.read_record().transpose()
    }
}
