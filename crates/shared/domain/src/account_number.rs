//! Account number sequence.
//!
//! Account numbers are fixed-width decimal strings. A new number is the most
//! recently issued one plus one, rendered at the same width. Callers must
//! serialize allocation; two writers reading the same latest number would
//! produce the same successor.

use crate::constants::DEFAULT_ACCOUNT_NUMBER;
use crate::error::{DomainError, DomainResult};

/// Fixed-width numeric account number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber {
    value: u64,
    width: usize,
}

impl AccountNumber {
    /// Number given to the first account ever created
    pub fn first() -> Self {
        // DEFAULT_ACCOUNT_NUMBER is a constant decimal literal
        Self {
            value: DEFAULT_ACCOUNT_NUMBER.parse().unwrap_or(1_000_000_000),
            width: DEFAULT_ACCOUNT_NUMBER.len(),
        }
    }

    /// Parse a stored account number, keeping its width.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidAccountNumber(raw.to_string()));
        }

        let value = raw
            .parse::<u64>()
            .map_err(|_| DomainError::InvalidAccountNumber(raw.to_string()))?;

        Ok(Self {
            value,
            width: raw.len(),
        })
    }

    /// The number following this one at the same width.
    pub fn next(&self) -> DomainResult<Self> {
        let value = self
            .value
            .checked_add(1)
            .filter(|v| v.to_string().len() <= self.width)
            .ok_or_else(|| DomainError::AccountNumberOverflow(self.to_string()))?;

        Ok(Self {
            value,
            width: self.width,
        })
    }

    /// Number to assign after `latest`, or the first number when nothing
    /// has been issued yet.
    pub fn following(latest: Option<&str>) -> DomainResult<Self> {
        match latest {
            Some(raw) => Self::parse(raw)?.next(),
            None => Ok(Self::first()),
        }
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.value, width = self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number() {
        assert_eq!(AccountNumber::following(None).unwrap().to_string(), "1000000000");
    }

    #[test]
    fn test_increments_latest() {
        let next = AccountNumber::following(Some("1000000012")).unwrap();
        assert_eq!(next.to_string(), "1000000013");
    }

    #[test]
    fn test_keeps_zero_padding() {
        let next = AccountNumber::following(Some("0000000099")).unwrap();
        assert_eq!(next.to_string(), "0000000100");
    }

    #[test]
    fn test_overflow_is_rejected() {
        let result = AccountNumber::following(Some("9999999999"));
        assert_eq!(
            result,
            Err(DomainError::AccountNumberOverflow("9999999999".to_string()))
        );
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert!(matches!(
            AccountNumber::parse("10000a0000"),
            Err(DomainError::InvalidAccountNumber(_))
        ));
        assert!(matches!(
            AccountNumber::parse("-100000000"),
            Err(DomainError::InvalidAccountNumber(_))
        ));
        assert!(AccountNumber::parse("").is_err());
    }
}
