//! Back-office route registrations evaluated by `POST /access/evaluate`.

use rahala_domain::permission::{MANAGE_ROLES, MANAGE_USERS};
use rahala_domain::role::Role;
use rahala_domain::route::{RouteRequirement, RouteTable};
use rahala_domain::section::Section;

/// Client path of a section: `/` + key, with `_` written as `-`.
pub fn section_path(section: Section) -> String {
    format!("/{}", section.key().replace('_', "-"))
}

pub fn back_office_routes() -> RouteTable {
    let table = Section::ALL
        .into_iter()
        .fold(RouteTable::new(), |table, section| {
            table.register(section_path(section), RouteRequirement::section(section))
        });
    table
        .register("/", RouteRequirement::authenticated())
        .register("/users", RouteRequirement::permission(MANAGE_USERS))
        .register("/roles", RouteRequirement::permission(MANAGE_ROLES))
        .register(
            "/shifts",
            RouteRequirement::allowed_roles([
                Role::GeneralManager,
                Role::ExecutiveManager,
                Role::BranchManager,
                Role::ShiftSupervisor,
            ]),
        )
}
