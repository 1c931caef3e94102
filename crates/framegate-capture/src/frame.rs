use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// A single captured frame: an opaque encoded payload plus the name of the
/// sensor it came from. Immutable once captured; the payload is shared so a
/// batch can sit in the ring and the send queue without copying pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    pub source_name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl Frame {
    pub fn new(source_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            source_name: source_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Delivery name embedding the capture time, so chronology survives
    /// batching and merging downstream: `<rfc3339-millis>_<source_name>`.
    pub fn stamped_name(&self, captured_at: DateTime<Utc>) -> String {
        format!(
            "{}_{}",
            captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.source_name
        )
    }
}

/// All frames produced by one capture call. A batch shares one capture
/// timestamp and is the atomic unit of storage, eviction, and delivery.
#[derive(Debug, Clone)]
pub struct FrameBatch {
    pub frames: Vec<Frame>,
    pub captured_at: DateTime<Utc>,
}

impl FrameBatch {
    pub fn new(frames: Vec<Frame>, captured_at: DateTime<Utc>) -> Self {
        Self {
            frames,
            captured_at,
        }
    }

    /// Copy of this batch with every frame renamed for delivery.
    pub fn stamped(&self) -> FrameBatch {
        FrameBatch {
            frames: self
                .frames
                .iter()
                .map(|f| Frame {
                    source_name: f.stamped_name(self.captured_at),
                    mime_type: f.mime_type.clone(),
                    data: Arc::clone(&f.data),
                })
                .collect(),
            captured_at: self.captured_at,
        }
    }
}

/// Capture metadata returned alongside pulled frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMetadata {
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamped_name_embeds_rfc3339_capture_time() {
        let frame = Frame::new("color", "image/jpeg", vec![1, 2, 3]);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();

        let name = frame.stamped_name(at);
        assert_eq!(name, "2024-05-01T12:30:45.000Z_color");

        let (ts, rest) = name.split_once('_').unwrap();
        assert_eq!(rest, "color");
        assert_eq!(ts.parse::<DateTime<Utc>>().unwrap(), at);
    }

    #[test]
    fn stamped_batch_shares_payload() {
        let at = Utc::now();
        let batch = FrameBatch::new(vec![Frame::new("ir", "image/jpeg", vec![9; 16])], at);

        let stamped = batch.stamped();
        assert_eq!(stamped.captured_at, at);
        assert!(Arc::ptr_eq(&stamped.frames[0].data, &batch.frames[0].data));
        assert!(stamped.frames[0].source_name.ends_with("_ir"));
    }
}
