//! Sequential matcher
//!
//! Binds timed events from the alignment service to tokens of the canonical
//! word sequence with a single forward cursor:
//!
//! 1. For each event, advance the cursor past tokens whose text differs.
//! 2. If the cursor runs off the end, stop: no later event can match.
//! 3. Otherwise bind the event to the token under the cursor and step past it.
//!
//! Text comparison is exact (byte-for-byte). Each token is bound at most once
//! and bindings are monotonic in token index. Events whose text does not
//! occur in the remaining tokens consume those tokens and end the scan; a
//! repeated word binds to its first occurrence after the cursor.

use crate::models::{TimedEvent, Token};

/// One event bound to one token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordMatch<'a> {
    pub token: &'a Token,
    pub event: &'a TimedEvent,
}

/// Counters describing one matching pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub tokens: usize,
    pub events: usize,
    pub matched: usize,
    /// Events never examined because the cursor reached the end first
    pub events_unexamined: usize,
}

/// Forward-only cursor over a token sequence
#[derive(Debug)]
pub struct MatchCursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> MatchCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Current cursor position (never decreases)
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Skip ahead to the next token whose text equals `text` and consume it
    ///
    /// Returns `None` (with the cursor exhausted) when no remaining token
    /// matches.
    pub fn advance_to(&mut self, text: &str) -> Option<&'a Token> {
        while self.position < self.tokens.len() && self.tokens[self.position].text != text {
            self.position += 1;
        }

        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }
}

/// Match `events` against `tokens`
pub fn match_sequences<'a>(tokens: &'a [Token], events: &'a [TimedEvent]) -> Vec<WordMatch<'a>> {
    match_sequences_with_stats(tokens, events).0
}

/// Match `events` against `tokens`, also reporting counters
pub fn match_sequences_with_stats<'a>(
    tokens: &'a [Token],
    events: &'a [TimedEvent],
) -> (Vec<WordMatch<'a>>, MatchStats) {
    let mut cursor = MatchCursor::new(tokens);
    let mut matches = Vec::with_capacity(tokens.len().min(events.len()));
    let mut examined = 0;

    for event in events {
        examined += 1;
        match cursor.advance_to(&event.text) {
            Some(token) => matches.push(WordMatch { token, event }),
            None => {
                tracing::debug!(
                    event_text = %event.text,
                    start = event.start,
                    "No remaining token matches event, ending scan"
                );
                break;
            }
        }
    }

    let stats = MatchStats {
        tokens: tokens.len(),
        events: events.len(),
        matched: matches.len(),
        events_unexamined: events.len() - examined,
    };

    (matches, stats)
}
