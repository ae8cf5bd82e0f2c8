use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use rahala_domain::role::Role;

use crate::domain::types::ProviderErrorCode;

/// Access service domain error variants.
///
/// `Display` is the operator-facing text used in logs; [`Self::user_message`]
/// is the localized text shown to staff.
#[derive(Debug, thiserror::Error)]
pub enum AccessServiceError {
    #[error("identifier is required")]
    EmptyIdentifier,
    #[error("secret is required")]
    EmptySecret,
    #[error("invalid credential for administrator")]
    InvalidAdminCredential,
    #[error("identity provider rejected sign-in: {0}")]
    Provider(ProviderErrorCode),
    #[error("no account found for this identifier")]
    AccountNotFound,
    #[error("account disabled")]
    AccountDisabled,
    #[error("could not confirm administrator provisioning")]
    ProvisioningUnconfirmed,
    #[error("profile unavailable after retries")]
    ProfileUnavailable,
    #[error("profile store denied access")]
    StorePermissionDenied,
    #[error("an active {0} profile already exists")]
    SingletonRoleTaken(Role),
    #[error("missing data")]
    MissingData,
    #[error("superseded by a newer session change")]
    Superseded,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccessServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyIdentifier => "EMPTY_IDENTIFIER",
            Self::EmptySecret => "EMPTY_SECRET",
            Self::InvalidAdminCredential => "INVALID_ADMIN_CREDENTIAL",
            Self::Provider(code) => code.kind(),
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::ProvisioningUnconfirmed => "PROVISIONING_UNCONFIRMED",
            Self::ProfileUnavailable => "PROFILE_UNAVAILABLE",
            Self::StorePermissionDenied => "STORE_PERMISSION_DENIED",
            Self::SingletonRoleTaken(_) => "SINGLETON_ROLE_TAKEN",
            Self::MissingData => "MISSING_DATA",
            Self::Superseded => "SUPERSEDED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Localized message for staff.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyIdentifier => "يرجى إدخال البريد الإلكتروني أو الرقم الوظيفي",
            Self::EmptySecret => "يرجى إدخال كلمة المرور",
            Self::InvalidAdminCredential => "كلمة مرور مدير النظام غير صحيحة",
            Self::Provider(code) => code.user_message(),
            Self::AccountNotFound => "لا يوجد حساب مرتبط بهذا المعرف",
            Self::AccountDisabled => "تم تعطيل هذا الحساب، يرجى التواصل مع مدير النظام",
            Self::ProvisioningUnconfirmed => "تعذر تأكيد إنشاء حساب مدير النظام، حاول مرة أخرى",
            Self::ProfileUnavailable => "تعذر تحميل بيانات المستخدم، يرجى تسجيل الدخول مرة أخرى",
            Self::StorePermissionDenied => "لا تملك صلاحية الوصول إلى بيانات المستخدم",
            Self::SingletonRoleTaken(Role::GeneralManager) => {
                "لا يمكن إنشاء أكثر من حساب مدير عام واحد"
            }
            Self::SingletonRoleTaken(Role::ExecutiveManager) => {
                "لا يمكن إنشاء أكثر من حساب مدير تنفيذي واحد"
            }
            Self::SingletonRoleTaken(_) => "لا يمكن إنشاء أكثر من حساب مدير نظام واحد",
            Self::MissingData => "يرجى تعبئة الحقول المطلوبة",
            Self::Superseded => "تم استبدال هذه المحاولة بعملية أحدث",
            Self::Internal(_) => "حدث خطأ غير متوقع، يرجى المحاولة لاحقاً",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyIdentifier | Self::EmptySecret | Self::MissingData => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidAdminCredential => StatusCode::UNAUTHORIZED,
            Self::Provider(ProviderErrorCode::TooManyRequests) => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider(_) => StatusCode::UNAUTHORIZED,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::AccountDisabled | Self::StorePermissionDenied => StatusCode::FORBIDDEN,
            Self::ProvisioningUnconfirmed | Self::ProfileUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::SingletonRoleTaken(_) | Self::Superseded => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccessServiceError {
    fn into_response(self) -> Response {
        // 4xx are expected outcomes of a sign-in form; only log what an
        // operator has to act on.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "success": false,
            "kind": self.kind(),
            "error": self.user_message(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
