use serde::{Deserialize, Serialize};

/// A labeled confidence returned by a classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Pixel-space bounding box of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A labeled, localized confidence returned by an object detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub score: f64,
    pub region: Region,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64, region: Region) -> Self {
        Self {
            label: label.into(),
            score,
            region,
        }
    }
}

/// Outcome of evaluating one frame against the configured predicate lists.
///
/// `Inhibited` always wins: once an inhibitor matches, no acceptor is
/// consulted and the frame can never cause a trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Inhibited { label: String },
    Accepted { label: String },
    Abstained,
}

impl Verdict {
    pub fn is_trigger(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}
