//! Pseudonym derivation and the run-scoped collision ledger.

use std::collections::{HashMap, HashSet};
use std::fmt;

use reclaim_model::{PiiClass, PseudonymClaim};

use crate::digest::keyed_digest;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Blair", "Casey", "Dana", "Emery", "Finley", "Gray", "Harper", "Indy", "Jordan",
    "Kai", "Logan", "Morgan", "Noel", "Oakley", "Parker", "Quinn", "Riley", "Sage", "Taylor",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Brooks", "Carter", "Dalton", "Ellis", "Fischer", "Garner", "Hayes", "Irwin",
    "Jensen", "Keller", "Lowell", "Mercer", "Norris", "Osborne", "Pryor", "Reyes", "Sutton",
    "Thorne", "Vance",
];

/// Rounds drawn from the name lists alone; later rounds add a digest suffix.
const PLAIN_ROUNDS: u32 = 8;

/// Surrogate for an input digest at a given collision round.
pub(crate) fn surrogate(key: &str, class: PiiClass, input_digest: &str, round: u32) -> String {
    let seed = keyed_digest(
        key,
        &[b"pseudonym", input_digest.as_bytes(), &round.to_be_bytes()],
    );
    let pick = |offset: usize, len: usize| {
        usize::from(u16::from_be_bytes([seed[offset], seed[offset + 1]])) % len
    };
    let first = FIRST_NAMES[pick(0, FIRST_NAMES.len())];
    let last = LAST_NAMES[pick(2, LAST_NAMES.len())];
    let suffix = if round >= PLAIN_ROUNDS {
        format!("{:02x}{:02x}{:02x}", seed[4], seed[5], seed[6])
    } else {
        String::new()
    };

    match class {
        PiiClass::Name => {
            if suffix.is_empty() {
                format!("{first} {last}")
            } else {
                format!("{first} {last}-{suffix}")
            }
        }
        PiiClass::Email => format!(
            "{}.{}{suffix}@example.invalid",
            first.to_ascii_lowercase(),
            last.to_ascii_lowercase()
        ),
        PiiClass::Phone => {
            let line = u32::from_be_bytes([seed[7], seed[8], seed[9], seed[10]]) % 10_000;
            format!("555{:03}{line:04}{suffix}", pick(11, 1000))
        }
        PiiClass::Ssn | PiiClass::CreditCard | PiiClass::Other => {
            format!(
                "PSEUDO_{class}_{first}{last}{suffix}",
                first = first.to_ascii_uppercase(),
                last = last.to_ascii_uppercase()
            )
        }
    }
}

/// Run-scoped registry of issued pseudonyms.
///
/// Fed in input order from the single aggregation path, so resolution is
/// deterministic. The same input digest always resolves to the same
/// surrogate; distinct inputs never share one.
#[derive(Default)]
pub struct PseudonymLedger {
    key: String,
    by_input: HashMap<(PiiClass, String), String>,
    issued: HashSet<(PiiClass, String)>,
    collisions: usize,
}

impl fmt::Debug for PseudonymLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudonymLedger")
            .field("issued", &self.issued.len())
            .field("collisions", &self.collisions)
            .finish_non_exhaustive()
    }
}

impl PseudonymLedger {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Final surrogate for a claim, re-deriving with later rounds on collision.
    pub fn resolve(&mut self, claim: &PseudonymClaim) -> String {
        let input = (claim.class, claim.digest.clone());
        if let Some(existing) = self.by_input.get(&input) {
            return existing.clone();
        }
        let mut round = claim.round;
        loop {
            let candidate = surrogate(&self.key, claim.class, &claim.digest, round);
            if self.issued.insert((claim.class, candidate.clone())) {
                self.by_input.insert(input, candidate.clone());
                return candidate;
            }
            self.collisions += 1;
            round += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.by_input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_input.is_empty()
    }

    /// Collisions resolved so far.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(digest: &str) -> PseudonymClaim {
        PseudonymClaim {
            class: PiiClass::Name,
            digest: digest.to_string(),
            round: 0,
        }
    }

    #[test]
    fn same_input_same_surrogate() {
        let mut ledger = PseudonymLedger::new("k");
        let a = ledger.resolve(&claim("aa"));
        let b = ledger.resolve(&claim("aa"));
        assert_eq!(a, b);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn distinct_inputs_never_share() {
        let mut ledger = PseudonymLedger::new("k");
        let mut seen = HashSet::new();
        // 400 name combinations, so collisions are certain.
        for i in 0..1000 {
            let surrogate = ledger.resolve(&claim(&format!("{i:064x}")));
            assert!(seen.insert(surrogate), "duplicate surrogate at {i}");
        }
        assert!(ledger.collisions() > 0);
    }

    #[test]
    fn shapes_follow_class() {
        let email = surrogate("k", PiiClass::Email, "aa", 0);
        assert!(email.ends_with("@example.invalid"), "{email}");
        let phone = surrogate("k", PiiClass::Phone, "aa", 0);
        assert_eq!(phone.len(), 10);
        assert!(phone.chars().all(|c| c.is_ascii_digit()));
        assert!(surrogate("k", PiiClass::Ssn, "aa", 0).starts_with("PSEUDO_SSN_"));
        assert!(surrogate("k", PiiClass::Name, "aa", PLAIN_ROUNDS).contains('-'));
    }
}
