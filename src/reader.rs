//! Card reader abstraction.
//!
//! Readers deliver the raw token of a presented card. Device transport is
//! left to implementations; [`MockCardReader`] serves tests, benchmarks and
//! development setups without hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::{PunchRequest, PunchType};
use crate::validation::IdentityResolver;

/// One card presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRead {
    /// The raw token as read from the card (hex identifier).
    pub token: String,
    /// The token hashed with the configured secret.
    pub hash: String,
}

impl CardRead {
    /// Builds a punch submission for this card read.
    pub fn into_request(self, punch_type: PunchType) -> PunchRequest {
        PunchRequest {
            card_hash: Some(self.hash),
            ..PunchRequest::from_token(self.token, punch_type)
        }
    }
}

/// A source of card reads.
pub trait CardReader: Send + Sync {
    /// Returns the next presented card, or `None` if no card is waiting.
    fn read_token(&self) -> Option<CardRead>;
}

/// A [`CardReader`] fed programmatically.
///
/// Hashes use the BIN scheme for hex tokens and the STR scheme otherwise.
///
/// # Example
///
/// ```
/// use punch_engine::reader::{CardReader, MockCardReader};
/// use punch_engine::validation::IdentityResolver;
///
/// let reader = MockCardReader::new(IdentityResolver::new("secret"));
/// reader.present("04a1b2c3");
///
/// let read = reader.read_token().unwrap();
/// assert_eq!(read.token, "04a1b2c3");
/// assert_eq!(read.hash.len(), 64);
/// assert!(reader.read_token().is_none());
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    resolver: IdentityResolver,
    presented: Mutex<VecDeque<String>>,
}

impl MockCardReader {
    /// Creates a reader hashing with `resolver`'s secret.
    pub fn new(resolver: IdentityResolver) -> Self {
        Self {
            resolver,
            presented: Mutex::new(VecDeque::new()),
        }
    }

    /// Simulates a card being held against the reader.
    pub fn present(&self, token: impl Into<String>) {
        self.presented
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(token.into());
    }
}

impl CardReader for MockCardReader {
    fn read_token(&self) -> Option<CardRead> {
        let token = self
            .presented
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()?;
        let hash = self
            .resolver
            .bin_hash(&token)
            .unwrap_or_else(|| self.resolver.str_hash(&token));
        Some(CardRead { token, hash })
    }
}
