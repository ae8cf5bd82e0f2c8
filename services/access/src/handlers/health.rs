use axum::http::StatusCode;

/// `GET /healthz`: the process is serving.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`: sessions are opened on demand, so serving means ready.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
