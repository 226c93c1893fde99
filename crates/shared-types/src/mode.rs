//! # Referral Handling Mode
//!
//! Chosen by the caller per operation (or taken from the session default)
//! and read-only while the operation is classified.

use crate::errors::DirectoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How delegation markers met while resolving a name are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralMode {
    /// Surface delegations as referrals carrying continuation URLs.
    #[default]
    Throw,
    /// Abandon the operation with a partial-result failure.
    Ignore,
    /// Treat referral entries as ordinary data.
    ManageDsaIt,
}

impl ReferralMode {
    /// Mode for a core-API call carrying only the ManageDsaIT control flag.
    pub fn from_manage_dsa_it(flag: bool) -> Self {
        if flag {
            Self::ManageDsaIt
        } else {
            Self::Throw
        }
    }

    /// True when referral entries are handled as plain data.
    pub fn manages_dsa_it(self) -> bool {
        self == Self::ManageDsaIt
    }
}

impl fmt::Display for ReferralMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Throw => "throw",
            Self::Ignore => "ignore",
            Self::ManageDsaIt => "manage_dsa_it",
        };
        f.write_str(s)
    }
}

impl FromStr for ReferralMode {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "throw" => Ok(Self::Throw),
            "ignore" => Ok(Self::Ignore),
            "manage_dsa_it" | "managedsait" => Ok(Self::ManageDsaIt),
            other => Err(DirectoryError::UnwillingToPerform(format!(
                "unsupported referral mode {:?}",
                other
            ))),
        }
    }
}
