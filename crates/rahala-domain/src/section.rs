//! Coarse-grained application sections and the section→permission table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::*;

/// A named area of the back office.
///
/// Section keys are independent of permission strings; [`Section::permissions`]
/// is the fixed table translating one into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Customers,
    Bookings,
    Flights,
    Hotels,
    Visas,
    Tours,
    Suppliers,
    Employees,
    Accounting,
    Revenues,
    Expenses,
    Invoices,
    Receipts,
    FinancialReports,
    Reports,
    Notifications,
    Settings,
    Admin,
}

impl Section {
    pub const ALL: [Section; 19] = [
        Self::Dashboard,
        Self::Customers,
        Self::Bookings,
        Self::Flights,
        Self::Hotels,
        Self::Visas,
        Self::Tours,
        Self::Suppliers,
        Self::Employees,
        Self::Accounting,
        Self::Revenues,
        Self::Expenses,
        Self::Invoices,
        Self::Receipts,
        Self::FinancialReports,
        Self::Reports,
        Self::Notifications,
        Self::Settings,
        Self::Admin,
    ];

    /// Parse a section key. Returns `None` for keys outside the closed set.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Customers => "customers",
            Self::Bookings => "bookings",
            Self::Flights => "flights",
            Self::Hotels => "hotels",
            Self::Visas => "visas",
            Self::Tours => "tours",
            Self::Suppliers => "suppliers",
            Self::Employees => "employees",
            Self::Accounting => "accounting",
            Self::Revenues => "revenues",
            Self::Expenses => "expenses",
            Self::Invoices => "invoices",
            Self::Receipts => "receipts",
            Self::FinancialReports => "financial_reports",
            Self::Reports => "reports",
            Self::Notifications => "notifications",
            Self::Settings => "settings",
            Self::Admin => "admin",
        }
    }

    /// Permission strings that each grant this section. Any one suffices.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Self::Dashboard => &[VIEW_DASHBOARD],
            Self::Customers => &[VIEW_CUSTOMERS, MANAGE_CUSTOMERS],
            Self::Bookings => &[VIEW_BOOKINGS, MANAGE_BOOKINGS],
            Self::Flights => &[MANAGE_FLIGHTS, MANAGE_BOOKINGS],
            Self::Hotels => &[MANAGE_HOTELS, MANAGE_BOOKINGS],
            Self::Visas => &[MANAGE_VISAS, MANAGE_BOOKINGS],
            Self::Tours => &[MANAGE_TOURS, MANAGE_BOOKINGS],
            Self::Suppliers => &[MANAGE_SUPPLIERS],
            Self::Employees => &[MANAGE_EMPLOYEES, MANAGE_USERS],
            Self::Accounting => &[VIEW_ACCOUNTING, MANAGE_ACCOUNTING],
            Self::Revenues => &[VIEW_REVENUES, MANAGE_ACCOUNTING],
            Self::Expenses => &[VIEW_EXPENSES, MANAGE_ACCOUNTING],
            Self::Invoices => &[VIEW_INVOICES, MANAGE_INVOICES],
            Self::Receipts => &[VIEW_RECEIPTS, MANAGE_RECEIPTS],
            Self::FinancialReports => &[VIEW_FINANCIAL_REPORTS, MANAGE_ACCOUNTING],
            Self::Reports => &[VIEW_REPORTS],
            Self::Notifications => &[VIEW_NOTIFICATIONS],
            Self::Settings => &[MANAGE_SETTINGS],
            Self::Admin => &[MANAGE_USERS, MANAGE_ROLES],
        }
    }

    /// The accounting family, additionally open to finance roles.
    pub fn is_finance(self) -> bool {
        matches!(
            self,
            Self::Accounting
                | Self::Revenues
                | Self::Expenses
                | Self::Invoices
                | Self::Receipts
                | Self::FinancialReports
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
