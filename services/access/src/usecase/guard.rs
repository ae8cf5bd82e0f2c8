use serde::Serialize;

use rahala_domain::route::RouteRequirement;
use rahala_domain::session::SessionSnapshot;

/// Outcome of one navigation attempt against a route requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; show a wait indicator.
    Wait,
    Render,
    /// Not signed in. `from` is the location to return to after sign-in.
    RedirectToSignIn { from: String },
    /// Signed in but not authorized.
    RedirectToLanding { notice: GuardNotice },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardNotice {
    NotAuthorized,
}

impl GuardNotice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAuthorized => "not_authorized",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotAuthorized => "ليس لديك صلاحية للوصول إلى هذه الصفحة",
        }
    }
}

/// Decide a navigation. Pure: the same session and requirement always yield
/// the same decision.
pub fn evaluate(
    session: &SessionSnapshot,
    requirement: &RouteRequirement,
    attempted_path: &str,
) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Wait;
    }
    let Some(identity) = session.identity.as_ref() else {
        return GuardDecision::RedirectToSignIn {
            from: attempted_path.to_owned(),
        };
    };

    let denied = GuardDecision::RedirectToLanding {
        notice: GuardNotice::NotAuthorized,
    };

    if let Some(ref role) = requirement.required_role {
        if identity.role() != role && !identity.is_admin {
            return denied;
        }
    }
    if let Some(ref roles) = requirement.allowed_roles {
        if !roles.contains(identity.role()) && !identity.is_admin {
            return denied;
        }
    }
    if let Some(ref permission) = requirement.required_permission {
        if !identity.check_permission(permission) {
            return denied;
        }
    }
    if let Some(ref section) = requirement.required_section {
        if !identity.can_access_section(section) {
            return denied;
        }
    }
    GuardDecision::Render
}
