//! Modification code capability.
//!
//! # Responsibility
//! - Represent the bearer secret that authorizes edits and deletes.
//! - Classify submitted codes as missing, malformed or mismatched.
//!
//! # Invariants
//! - Codes are v4 UUIDs generated independently of note ids.
//! - Equality always inspects all 16 bytes.
//! - `Debug` never prints the secret.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Secret capability granting edit/delete rights on one note.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModificationCode(Uuid);

impl ModificationCode {
    /// Generates a fresh random code.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses caller-supplied text into a code.
    ///
    /// Absent or blank input is `Missing`; anything `Uuid::parse_str`
    /// rejects is `Malformed`.
    pub fn parse(submitted: Option<&str>) -> Result<Self, CodeCheckError> {
        let text = submitted.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(CodeCheckError::Missing);
        }
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|_| CodeCheckError::Malformed)
    }

    /// Checks a submitted code against the stored one.
    pub fn verify(submitted: Option<&str>, stored: &Self) -> Result<(), CodeCheckError> {
        let candidate = Self::parse(submitted)?;
        if candidate == *stored {
            Ok(())
        } else {
            Err(CodeCheckError::Mismatch)
        }
    }
}

impl PartialEq for ModificationCode {
    fn eq(&self, other: &Self) -> bool {
        let diff = self
            .0
            .as_bytes()
            .iter()
            .zip(other.0.as_bytes())
            .fold(0u8, |acc, (left, right)| acc | (left ^ right));
        diff == 0
    }
}

impl Eq for ModificationCode {}

impl Debug for ModificationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModificationCode(***)")
    }
}

/// Renders the hyphenated form shown to the creator once.
impl Display for ModificationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Why a submitted modification code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheckError {
    Missing,
    Malformed,
    Mismatch,
}

impl CodeCheckError {
    /// Stable id for log lines.
    pub fn code(self) -> &'static str {
        match self {
            Self::Missing => "code_missing",
            Self::Malformed => "code_malformed",
            Self::Mismatch => "code_mismatch",
        }
    }
}

impl Display for CodeCheckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "modification code is required"),
            Self::Malformed => write!(f, "modification code has an invalid format"),
            Self::Mismatch => write!(f, "modification code does not match"),
        }
    }
}

impl Error for CodeCheckError {}

#[cfg(test)]
mod tests {
    use super::{CodeCheckError, ModificationCode};
    use uuid::Uuid;

    #[test]
    fn verify_distinguishes_missing_malformed_and_mismatch() {
        let stored = ModificationCode::generate();

        assert_eq!(
            ModificationCode::verify(None, &stored),
            Err(CodeCheckError::Missing)
        );
        assert_eq!(
            ModificationCode::verify(Some("  "), &stored),
            Err(CodeCheckError::Missing)
        );
        assert_eq!(
            ModificationCode::verify(Some("not-a-code"), &stored),
            Err(CodeCheckError::Malformed)
        );
        let other = Uuid::new_v4().to_string();
        assert_eq!(
            ModificationCode::verify(Some(other.as_str()), &stored),
            Err(CodeCheckError::Mismatch)
        );
    }

    #[test]
    fn verify_accepts_alternate_uuid_spellings() {
        let stored = ModificationCode::generate();
        let simple = stored.as_uuid().simple().to_string();
        let braced = format!(" {} ", stored.as_uuid().braced());

        assert_eq!(ModificationCode::verify(Some(simple.as_str()), &stored), Ok(()));
        assert_eq!(ModificationCode::verify(Some(braced.as_str()), &stored), Ok(()));
    }

    #[test]
    fn debug_masks_secret() {
        let code = ModificationCode::generate();
        let rendered = format!("{code:?}");
        assert!(!rendered.contains(&code.to_string()));
    }
}
