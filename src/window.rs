use crate::config::{FLANK, MIN_FLANK};
use crate::{Hit, Strand, Terminus};

/// Side of the motif, in read coordinates, that the flank is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Upstream,
    Downstream,
}

impl Side {
    /// The motif is read 5'->3' on its own strand, so on the reverse strand
    /// the 5'/3' sides swap relative to read coordinates.
    pub fn of(strand: Strand, terminus: Terminus) -> Self {
        match (strand, terminus) {
            (Strand::Forward, Terminus::FivePrime) | (Strand::Reverse, Terminus::ThreePrime) => {
                Side::Upstream
            }
            (Strand::Forward, Terminus::ThreePrime) | (Strand::Reverse, Terminus::FivePrime) => {
                Side::Downstream
            }
        }
    }
}

/// 1-indexed bounds of the flank extracted next to a motif hit.
///
/// An upstream flank covers `[seq_from, seq_to)`, with `seq_to` being the
/// motif start; a downstream flank covers `(seq_from, seq_to]`, with
/// `seq_from` being the motif end. Either way the flank is
/// `seq_to - seq_from` bases wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionWindow {
    pub seq_from: usize,
    pub seq_to: usize,
}

impl ExtractionWindow {
    /// Compute the window for a hit, or `None` when fewer than `MIN_FLANK`
    /// bases separate the motif from the read boundary.
    pub fn for_hit(hit: &Hit) -> Option<Self> {
        if hit.motif_start == 0 || hit.motif_end > hit.read_length {
            return None;
        }

        match Side::of(hit.strand, hit.terminus) {
            Side::Upstream => {
                if hit.motif_start - 1 < MIN_FLANK {
                    return None;
                }
                Some(ExtractionWindow {
                    seq_from: hit.motif_start.saturating_sub(FLANK).max(1),
                    seq_to: hit.motif_start,
                })
            }
            Side::Downstream => {
                if hit.read_length - hit.motif_end < MIN_FLANK {
                    return None;
                }
                Some(ExtractionWindow {
                    seq_from: hit.motif_end,
                    seq_to: (hit.motif_end + FLANK).min(hit.read_length),
                })
            }
        }
    }

    pub fn width(&self) -> usize {
        self.seq_to - self.seq_from
    }

    /// 0-indexed, half-open byte range of the flank inside the read.
    pub fn flank_range(&self, side: Side) -> std::ops::Range<usize> {
        match side {
            Side::Upstream => self.seq_from - 1..self.seq_to - 1,
            Side::Downstream => self.seq_from..self.seq_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(strand: Strand, terminus: Terminus, start: usize, length: usize) -> Hit {
        Hit {
            read_id: "1".into(),
            terminus,
            strand,
            read_length: length,
            motif_start: start,
            motif_end: start + 19,
            mismatch: 0,
        }
    }

    #[test]
    fn forward_five_prime_takes_upstream_flank() {
        let w = ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::FivePrime, 60, 200))
            .unwrap();
        assert_eq!(w, ExtractionWindow { seq_from: 10, seq_to: 60 });
        assert_eq!(w.width(), FLANK);
        assert_eq!(w.flank_range(Side::Upstream), 9..59);
    }

    #[test]
    fn reverse_three_prime_near_start_is_rejected() {
        assert!(
            ExtractionWindow::for_hit(&hit(Strand::Reverse, Terminus::ThreePrime, 15, 200))
                .is_none()
        );
    }

    #[test]
    fn downstream_flank_is_clipped_to_read_length() {
        // motif ends at 159, 41 bases remain
        let w = ExtractionWindow::for_hit(&hit(Strand::Reverse, Terminus::FivePrime, 140, 200))
            .unwrap();
        assert_eq!(w, ExtractionWindow { seq_from: 159, seq_to: 200 });
        assert_eq!(w.flank_range(Side::Downstream), 159..200);

        let w = ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::ThreePrime, 40, 200))
            .unwrap();
        assert_eq!(w, ExtractionWindow { seq_from: 59, seq_to: 109 });
    }

    #[test]
    fn upstream_flank_is_clipped_to_read_start() {
        let w = ExtractionWindow::for_hit(&hit(Strand::Reverse, Terminus::ThreePrime, 31, 200))
            .unwrap();
        assert_eq!(w, ExtractionWindow { seq_from: 1, seq_to: 31 });
    }

    #[test]
    fn minimum_flank_boundary() {
        // exactly 20 bases before the motif is enough
        assert!(
            ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::FivePrime, 21, 200))
                .is_some()
        );
        assert!(
            ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::FivePrime, 20, 200))
                .is_none()
        );
        // motif 100..119 in a read of 139 leaves 20 bases
        assert!(
            ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::ThreePrime, 100, 139))
                .is_some()
        );
        assert!(
            ExtractionWindow::for_hit(&hit(Strand::Forward, Terminus::ThreePrime, 100, 138))
                .is_none()
        );
    }

    #[test]
    fn windows_stay_inside_the_read() {
        for strand in [Strand::Forward, Strand::Reverse] {
            for terminus in [Terminus::FivePrime, Terminus::ThreePrime] {
                for start in 1..=181 {
                    if let Some(w) = ExtractionWindow::for_hit(&hit(strand, terminus, start, 200)) {
                        assert!(1 <= w.seq_from && w.seq_from <= w.seq_to && w.seq_to <= 200);
                        assert!(w.width() >= MIN_FLANK && w.width() <= FLANK);
                    }
                }
            }
        }
    }
}
