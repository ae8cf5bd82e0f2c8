//! Permission strings and the normalized permission set.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Universal wildcard: a profile holding it passes every permission check.
pub const ALL: &str = "all";

pub const VIEW_DASHBOARD: &str = "view_dashboard";
pub const VIEW_CUSTOMERS: &str = "view_customers";
pub const MANAGE_CUSTOMERS: &str = "manage_customers";
pub const VIEW_BOOKINGS: &str = "view_bookings";
pub const MANAGE_BOOKINGS: &str = "manage_bookings";
pub const MANAGE_FLIGHTS: &str = "manage_flights";
pub const MANAGE_HOTELS: &str = "manage_hotels";
pub const MANAGE_VISAS: &str = "manage_visas";
pub const MANAGE_TOURS: &str = "manage_tours";
pub const MANAGE_SUPPLIERS: &str = "manage_suppliers";
pub const MANAGE_EMPLOYEES: &str = "manage_employees";
pub const MANAGE_USERS: &str = "manage_users";
pub const MANAGE_ROLES: &str = "manage_roles";
pub const VIEW_ACCOUNTING: &str = "view_accounting";
pub const MANAGE_ACCOUNTING: &str = "manage_accounting";
pub const VIEW_REVENUES: &str = "view_revenues";
pub const VIEW_EXPENSES: &str = "view_expenses";
pub const VIEW_INVOICES: &str = "view_invoices";
pub const MANAGE_INVOICES: &str = "manage_invoices";
pub const VIEW_RECEIPTS: &str = "view_receipts";
pub const MANAGE_RECEIPTS: &str = "manage_receipts";
pub const VIEW_FINANCIAL_REPORTS: &str = "view_financial_reports";
pub const VIEW_REPORTS: &str = "view_reports";
pub const VIEW_NOTIFICATIONS: &str = "view_notifications";
pub const MANAGE_SETTINGS: &str = "manage_settings";

/// Normalized set of capability strings held by a profile.
///
/// Stored documents carry this field as an array, as a single legacy string,
/// or not at all. All three shapes deserialize here; it always serializes back
/// as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            items
                .into_iter()
                .map(Into::into)
                .map(|p: String| p.trim().to_owned())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// The `["all"]` set given to administrators.
    pub fn all() -> Self {
        Self::new([ALL])
    }

    /// True iff the set holds the wildcard or `permission` exactly.
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(ALL) || self.0.contains(permission)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.contains(ALL)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPermissions {
    Many(Vec<String>),
    One(String),
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawPermissions>::deserialize(deserializer)? {
            Some(RawPermissions::Many(items)) => Self::new(items),
            Some(RawPermissions::One(item)) => Self::new([item]),
            None => Self::default(),
        })
    }
}
