//! Evidential base: the derivation serials a sentence's truth rests on.
//!
//! Two sentences whose bases intersect must not be combined — doing so
//! would count the same evidence twice. Merging interleaves the parents'
//! serials (longer base first) and truncates, which bounds memory while
//! keeping the most recent serials of both parents.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MAX_STAMP_LENGTH;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Serial numbers of the input sentences this one is derived from,
    /// most recent first.
    pub serials: Vec<i64>,
    pub creation_time: i64,
}

impl Stamp {
    /// Stamp for a fresh input sentence with a scheduler-issued serial.
    pub fn new(serial: i64, creation_time: i64) -> Self {
        Self {
            serials: vec![serial],
            creation_time,
        }
    }

    /// Same evidential base, new creation time. Used when a single-premise
    /// conclusion inherits its parent's evidence.
    pub fn with_time(&self, creation_time: i64) -> Self {
        Self {
            serials: self.serials.clone(),
            creation_time,
        }
    }

    /// Whether the two bases share any serial. Overlapping evidence is
    /// circular or duplicated, so overlapping stamps never merge.
    pub fn overlaps(&self, other: &Stamp) -> bool {
        self.serials.iter().any(|s| other.serials.contains(s))
    }

    /// Merge two non-overlapping bases, alternating serials from the
    /// longer then the shorter parent, truncated to `MAX_STAMP_LENGTH`.
    /// Returns `None` when the bases overlap.
    pub fn merge(a: &Stamp, b: &Stamp, creation_time: i64) -> Option<Stamp> {
        if a.overlaps(b) {
            return None;
        }
        let (first, second) = if a.serials.len() >= b.serials.len() {
            (&a.serials, &b.serials)
        } else {
            (&b.serials, &a.serials)
        };
        let length = (first.len() + second.len()).min(MAX_STAMP_LENGTH);
        let mut serials = Vec::with_capacity(length);
        let mut i1 = 0;
        let mut i2 = 0;
        while i2 < second.len() && serials.len() < length {
            serials.push(first[i1]);
            i1 += 1;
            if serials.len() < length {
                serials.push(second[i2]);
                i2 += 1;
            }
        }
        while i1 < first.len() && serials.len() < length {
            serials.push(first[i1]);
            i1 += 1;
        }
        Some(Stamp {
            serials,
            creation_time,
        })
    }
}

impl fmt::Debug for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, s) in self.serials.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, " @{}}}", self.creation_time)
    }
}
