// motifs
pub const FIVE_PRIME_LTR: &str = "TGTGGGGAAAAGCAAGAGAG";
pub const THREE_PRIME_LTR: &str = "AGGGGCAACCCACCCCTACA";

// numeric values
pub const MIN_FLANK: usize = 20;
pub const FLANK: usize = 50;
pub const FLUSH_BATCH: usize = 1000;

// repeat table column offsets [chromosome, start, end]
pub const REPEAT_CHROM_COL: usize = 5;
pub const REPEAT_START_COL: usize = 6;
pub const REPEAT_END_COL: usize = 7;

// alignment output
pub const ALIGNMENT_FIELDS: usize = 12;
pub const MAX_SHORT_CHROM: usize = 2;

// file names
pub const EXTRACTED_SEQUENCES: &str = "extracted_sequences.fa";
pub const REPEATING_REGIONS: &str = "repeating_regions.out";
pub const FILTERED_HITS: &str = "filtered_blast.out";

// suffixes
pub const REPORT_SUFFIX: &str = "fuzznuc";
pub const INDEX_SUFFIX: &str = "json";
pub const READS_SUFFIX: &str = "FASTA";
