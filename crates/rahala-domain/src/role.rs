//! Staff role domain types.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Staff role held by a profile.
///
/// Wire format: snake_case string (`"branch_manager"`). Values written by older
/// screens that are not in the closed set survive as [`Role::Other`] so a
/// profile never fails to load because of its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    GeneralManager,
    ExecutiveManager,
    BranchManager,
    ShiftSupervisor,
    BookingAgent,
    Accountant,
    FinanceManager,
    Employee,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::GeneralManager => "general_manager",
            Self::ExecutiveManager => "executive_manager",
            Self::BranchManager => "branch_manager",
            Self::ShiftSupervisor => "shift_supervisor",
            Self::BookingAgent => "booking_agent",
            Self::Accountant => "accountant",
            Self::FinanceManager => "finance_manager",
            Self::Employee => "employee",
            Self::Other(s) => s,
        }
    }

    /// Roles that at most one active profile may hold.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::GeneralManager | Self::ExecutiveManager
        )
    }

    /// Roles that are granted the accounting family of sections.
    pub fn is_finance(&self) -> bool {
        matches!(self, Self::Accountant | Self::FinanceManager)
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "admin" => Self::Admin,
            "general_manager" => Self::GeneralManager,
            "executive_manager" => Self::ExecutiveManager,
            "branch_manager" => Self::BranchManager,
            "shift_supervisor" => Self::ShiftSupervisor,
            "booking_agent" => Self::BookingAgent,
            "accountant" => Self::Accountant,
            "finance_manager" => Self::FinanceManager,
            "employee" => Self::Employee,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
