//! Bank account domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty bank name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BankName(String);

impl BankName {
    /// Create a bank name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyBankName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyBankName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a bank name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for BankName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BankName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BankName::new(s)
    }
}

impl Display for BankName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a bank.
pub type BankId = i64;

/// A bank account that expenses can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Bank {
    pub id: BankId,
    pub name: BankName,
}

/// Form data for bank creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct BankFormData {
    pub name: String,
}

#[cfg(test)]
mod bank_name_tests {
    use crate::{Error, bank::BankName};

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(BankName::new("  "), Err(Error::EmptyBankName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        assert_eq!(BankName::new(" SBI "), Ok(BankName::new_unchecked("SBI")));
    }
}
