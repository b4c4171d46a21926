use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const PARTICIPANT_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PARTICIPANT_ID_LEN: usize = 6;

/// Short code handed to a participant when their survey is accepted.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let code = (0..PARTICIPANT_ID_LEN)
            .map(|_| char::from(PARTICIPANT_ID_ALPHABET[rng.gen_range(0..PARTICIPANT_ID_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// Period number, 1-based.
pub type Period = u32;

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn generated_codes_are_six_uppercase_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let id = ParticipantId::generate_with(&mut rng);
            assert_eq!(id.as_str().len(), 6);
            assert!(id.as_str().chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
