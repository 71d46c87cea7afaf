//! Tokens, timed events and the timestamp records produced from them

use chrono::NaiveTime;
use mushaf_common::time::offset_to_time_of_day;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One word position in the canonical surah text
///
/// `index` is the 0-based playback position; tokens are never reordered once
/// a sequence is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    /// Row id in `words`
    pub word_id: i64,
    /// Owning ayah
    pub ayah_id: i64,
    /// Exact surface form, compared byte-for-byte
    pub text: String,
}

/// One word-with-timing entry returned by the alignment service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub text: String,
    /// Seconds from the start of the recording
    pub start: f64,
    /// `None` when the service could not bound the word
    pub end: Option<f64>,
}

impl TimedEvent {
    pub fn new(text: impl Into<String>, start: f64, end: Option<f64>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Persisted link between a recitation and a surah
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub guid: Uuid,
    pub recitation_id: Uuid,
    pub surah_id: i64,
    pub file_id: Option<Uuid>,
}

/// Start/end timestamps bound to exactly one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampRecord {
    pub guid: Uuid,
    pub association_id: Uuid,
    pub word_id: i64,
    /// Token index the record was matched at
    pub token_index: usize,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
}

impl TimestampRecord {
    /// Bind `event`'s interval to `token`
    ///
    /// Returns `None` if the event carries a negative or non-finite offset;
    /// the alignment client rejects such bodies before they reach matching.
    pub fn from_match(association_id: Uuid, token: &Token, event: &TimedEvent) -> Option<Self> {
        let start_time = offset_to_time_of_day(event.start)?;
        let end_time = match event.end {
            Some(end) => Some(offset_to_time_of_day(end)?),
            None => None,
        };

        Some(Self {
            guid: Uuid::new_v4(),
            association_id,
            word_id: token.word_id,
            token_index: token.index,
            start_time,
            end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token {
            index: 3,
            word_id: 42,
            ayah_id: 7,
            text: "ٱلرَّحْمَٰنِ".to_string(),
        }
    }

    #[test]
    fn test_record_from_closed_interval() {
        let association = Uuid::new_v4();
        let event = TimedEvent::new("ٱلرَّحْمَٰنِ", 1.0, Some(1.2));

        let record = TimestampRecord::from_match(association, &token(), &event).unwrap();

        assert_eq!(record.association_id, association);
        assert_eq!(record.word_id, 42);
        assert_eq!(record.token_index, 3);
        assert_eq!(record.start_time, NaiveTime::from_hms_opt(0, 0, 1).unwrap());
        assert_eq!(
            record.end_time,
            Some(NaiveTime::from_hms_milli_opt(0, 0, 1, 200).unwrap())
        );
    }

    #[test]
    fn test_record_from_open_interval() {
        let event = TimedEvent::new("ٱلرَّحْمَٰنِ", 2.5, None);
        let record = TimestampRecord::from_match(Uuid::new_v4(), &token(), &event).unwrap();
        assert!(record.end_time.is_none());
    }

    #[test]
    fn test_record_rejects_negative_offset() {
        let event = TimedEvent::new("ٱلرَّحْمَٰنِ", -1.0, None);
        assert!(TimestampRecord::from_match(Uuid::new_v4(), &token(), &event).is_none());
    }
}
