//! Card identity resolution.
//!
//! Cards are never stored in the clear. A raw token read from a card is
//! hashed with a server-side secret and matched against the employee's stored
//! card hash. Two hashing schemes are in circulation and both are tried:
//!
//! - **BIN**: `sha256(hex_decode(token) ‖ secret)`, for tokens that are valid hex
//! - **STR**: `sha256(token ‖ secret)`, over the token's UTF-8 bytes
//!
//! A value that already looks like a hash (64 hex characters) is looked up as is.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Employee;
use crate::service::PunchRepository;

/// Length of a hex-encoded SHA-256 digest.
const HASH_HEX_LEN: usize = 64;

/// Resolves a presented card to an active employee.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    secret: String,
}

impl IdentityResolver {
    /// Creates a resolver using the given hashing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// BIN-scheme hash of a token; `None` if the token is not valid hex.
    ///
    /// # Example
    ///
    /// ```
    /// use punch_engine::validation::IdentityResolver;
    ///
    /// let resolver = IdentityResolver::new("secret");
    /// assert!(resolver.bin_hash("04a1b2c3").is_some());
    /// assert!(resolver.bin_hash("not-hex").is_none());
    /// ```
    pub fn bin_hash(&self, token: &str) -> Option<String> {
        let bytes = hex::decode(token.trim()).ok()?;
        Some(self.digest(&bytes))
    }

    /// STR-scheme hash of a token.
    pub fn str_hash(&self, token: &str) -> String {
        self.digest(token.trim().as_bytes())
    }

    /// Returns true if `value` is a hex-encoded SHA-256 digest.
    pub fn looks_like_hash(value: &str) -> bool {
        value.len() == HASH_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Returns the hashes to look up, in priority order.
    ///
    /// An explicit hash comes first. A token then adds its own candidates:
    /// itself if it already looks like a hash, otherwise BIN (hex tokens
    /// only) followed by STR. Duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequestNoId` if neither input carries a value.
    pub fn candidate_hashes(
        &self,
        card_token: Option<&str>,
        card_hash: Option<&str>,
    ) -> EngineResult<Vec<String>> {
        let hash = present(card_hash);
        let token = present(card_token);
        if hash.is_none() && token.is_none() {
            return Err(EngineError::InvalidRequestNoId);
        }

        let mut candidates: Vec<String> = Vec::with_capacity(3);
        let mut push = |candidate: String| {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        };
        if let Some(hash) = hash {
            push(hash.to_ascii_lowercase());
        }
        if let Some(token) = token {
            if Self::looks_like_hash(token) {
                push(token.to_ascii_lowercase());
            } else {
                if let Some(bin) = self.bin_hash(token) {
                    push(bin);
                }
                push(self.str_hash(token));
            }
        }
        Ok(candidates)
    }

    /// Resolves the card to an active employee.
    ///
    /// # Errors
    ///
    /// - `InvalidRequestNoId` if neither token nor hash is given
    /// - `EmployeeNotFound` if no candidate hash matches
    /// - `InactiveEmployee` if the match is disabled
    /// - `Repository` if the store fails
    pub fn resolve(
        &self,
        repo: &dyn PunchRepository,
        card_token: Option<&str>,
        card_hash: Option<&str>,
    ) -> EngineResult<Employee> {
        for candidate in self.candidate_hashes(card_token, card_hash)? {
            let Some(employee) = repo.find_employee_by_card_hash(&candidate)? else {
                continue;
            };
            if !employee.is_active {
                return Err(EngineError::InactiveEmployee {
                    employee_id: employee.id,
                });
            }
            debug!(employee_id = %employee.id, "Card resolved");
            return Ok(employee);
        }

        Err(EngineError::EmployeeNotFound)
    }

    fn digest(&self, bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.update(self.secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::{NewPunch, PunchEvent, PunchType};
    use crate::service::{InMemoryPunchRepository, RepositoryError, RepositoryResult};
    use chrono::NaiveDateTime;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Employee lookup where one employee may own several card hashes.
    struct CardTable {
        cards: HashMap<String, Employee>,
    }

    impl CardTable {
        fn new(employee: &Employee, hashes: &[String]) -> Self {
            let cards = hashes
                .iter()
                .map(|h| (h.clone(), employee.clone()))
                .collect();
            Self { cards }
        }
    }

    impl PunchRepository for CardTable {
        fn find_employee_by_card_hash(&self, card_hash: &str) -> RepositoryResult<Option<Employee>> {
            Ok(self.cards.get(card_hash).cloned())
        }

        fn find_employee(&self, employee_id: &str) -> RepositoryResult<Option<Employee>> {
            Ok(self.cards.values().find(|e| e.id == employee_id).cloned())
        }

        fn nearest_punch_of_type(
            &self,
            _employee_id: &str,
            _punch_type: PunchType,
            _around: NaiveDateTime,
        ) -> RepositoryResult<Option<PunchEvent>> {
            Ok(None)
        }

        fn punches_between(
            &self,
            _employee_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> RepositoryResult<Vec<PunchEvent>> {
            Ok(Vec::new())
        }

        fn insert_punch(&self, _punch: NewPunch) -> RepositoryResult<PunchEvent> {
            Err(RepositoryError::failure("card table is read-only"))
        }
    }

    fn resolver() -> IdentityResolver {
        IdentityResolver::new("test-secret")
    }

    fn make_employee(id: &str, card_hash: String, is_active: bool) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {}", id),
            card_hash,
            is_active,
            hourly_rate: None,
        }
    }

    #[test]
    fn test_hash_schemes_differ_for_hex_tokens() {
        let r = resolver();
        let bin = r.bin_hash("04a1b2c3").unwrap();
        let str_hash = r.str_hash("04a1b2c3");
        assert_ne!(bin, str_hash);
        assert!(IdentityResolver::looks_like_hash(&bin));
        assert!(IdentityResolver::looks_like_hash(&str_hash));
    }

    #[test]
    fn test_bin_hash_matches_manual_digest() {
        let mut hasher = Sha256::new();
        hasher.update([0x04, 0xa1]);
        hasher.update(b"test-secret");
        let expected = hex::encode(hasher.finalize());
        assert_eq!(resolver().bin_hash("04A1"), Some(expected));
    }

    #[test]
    fn test_secret_changes_hash() {
        assert_ne!(
            IdentityResolver::new("a").str_hash("card"),
            IdentityResolver::new("b").str_hash("card")
        );
    }

    #[test]
    fn test_resolves_bin_scheme_card() {
        let r = resolver();
        let repo = InMemoryPunchRepository::with_employees([make_employee(
            "emp_001",
            r.bin_hash("04a1b2c3").unwrap(),
            true,
        )]);

        let employee = r.resolve(&repo, Some("04a1b2c3"), None).unwrap();
        assert_eq!(employee.id, "emp_001");
    }

    #[test]
    fn test_falls_back_to_str_scheme() {
        let r = resolver();
        let repo = InMemoryPunchRepository::with_employees([make_employee(
            "emp_002",
            r.str_hash("04a1b2c3"),
            true,
        )]);

        let employee = r.resolve(&repo, Some("04a1b2c3"), None).unwrap();
        assert_eq!(employee.id, "emp_002");
    }

    #[test]
    fn test_non_hex_token_uses_str_scheme_only() {
        let r = resolver();
        let candidates = r.candidate_hashes(Some("EMP-CARD-7"), None).unwrap();
        assert_eq!(candidates, vec![r.str_hash("EMP-CARD-7")]);
    }

    #[test]
    fn test_hash_like_token_is_used_directly() {
        let r = resolver();
        let stored = r.str_hash("some-card");
        let repo =
            InMemoryPunchRepository::with_employees([make_employee("emp_003", stored.clone(), true)]);

        let upper = stored.to_ascii_uppercase();
        let employee = r.resolve(&repo, Some(&upper), None).unwrap();
        assert_eq!(employee.id, "emp_003");
    }

    #[test]
    fn test_explicit_hash_takes_priority() {
        let r = resolver();
        let stored = r.str_hash("card-a");
        let repo =
            InMemoryPunchRepository::with_employees([make_employee("emp_004", stored.clone(), true)]);

        let employee = r.resolve(&repo, Some("card-b"), Some(&stored)).unwrap();
        assert_eq!(employee.id, "emp_004");
    }

    #[test]
    fn test_explicit_hash_falls_back_to_token_schemes() {
        let r = resolver();
        let repo = InMemoryPunchRepository::with_employees([make_employee(
            "emp_006",
            r.str_hash("04a1b2c3"),
            true,
        )]);

        let bin = r.bin_hash("04a1b2c3").unwrap();
        let employee = r.resolve(&repo, Some("04a1b2c3"), Some(&bin)).unwrap();
        assert_eq!(employee.id, "emp_006");
    }

    #[test]
    fn test_candidates_put_explicit_hash_first_without_repeats() {
        let r = resolver();
        let bin = r.bin_hash("04a1b2c3").unwrap();
        let str_hash = r.str_hash("04a1b2c3");

        let candidates = r.candidate_hashes(Some("04a1b2c3"), Some(&bin)).unwrap();
        assert_eq!(candidates, vec![bin.clone(), str_hash.clone()]);

        let candidates = r.candidate_hashes(Some("04a1b2c3"), Some(&str_hash)).unwrap();
        assert_eq!(candidates, vec![str_hash, bin]);
    }

    #[test]
    fn test_both_schemes_registered_resolve_to_same_employee() {
        let r = resolver();
        let employee = make_employee("emp_007", String::new(), true);
        let bin = r.bin_hash("04a1b2c3").unwrap();
        let str_hash = r.str_hash("04a1b2c3");
        let repo = CardTable::new(&employee, &[bin.clone(), str_hash.clone()]);

        assert_eq!(r.resolve(&repo, Some("04a1b2c3"), None).unwrap().id, "emp_007");
        assert_eq!(r.resolve(&repo, None, Some(&bin)).unwrap().id, "emp_007");
        assert_eq!(r.resolve(&repo, None, Some(&str_hash)).unwrap().id, "emp_007");
        assert_eq!(r.resolve(&repo, Some(&bin), None).unwrap().id, "emp_007");
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let repo = InMemoryPunchRepository::new();
        let err = resolver().resolve(&repo, None, Some("  ")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequestNoId);
    }

    #[test]
    fn test_unknown_card_is_not_found() {
        let repo = InMemoryPunchRepository::new();
        let err = resolver().resolve(&repo, Some("04a1b2c3"), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmployeeNotFound);
    }

    #[test]
    fn test_inactive_employee_is_rejected() {
        let r = resolver();
        let repo = InMemoryPunchRepository::with_employees([make_employee(
            "emp_005",
            r.bin_hash("0badcafe").unwrap(),
            false,
        )]);

        let err = r.resolve(&repo, Some("0badcafe"), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InactiveEmployee);
    }

    #[test]
    fn test_unreachable_store_is_connectivity_error() {
        let repo = InMemoryPunchRepository::new();
        repo.set_unreachable(true);
        let err = resolver().resolve(&repo, Some("04a1b2c3"), None).unwrap_err();
        assert!(err.is_connectivity());
    }

    proptest! {
        #[test]
        fn prop_either_scheme_resolves_hex_tokens(token in "([0-9a-f]{2}){1,8}") {
            let r = resolver();
            let employee = make_employee("emp_008", String::new(), true);
            let bin = r.bin_hash(&token).unwrap();
            let str_hash = r.str_hash(&token);

            let both = CardTable::new(&employee, &[bin.clone(), str_hash.clone()]);
            for (t, h) in [
                (Some(token.as_str()), None),
                (None, Some(bin.as_str())),
                (None, Some(str_hash.as_str())),
            ] {
                prop_assert_eq!(r.resolve(&both, t, h).unwrap().id, "emp_008");
            }

            let legacy = CardTable::new(&employee, &[str_hash]);
            prop_assert_eq!(
                r.resolve(&legacy, Some(&token), Some(&bin)).unwrap().id,
                "emp_008"
            );
        }
    }
}
