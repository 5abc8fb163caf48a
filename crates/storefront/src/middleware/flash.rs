//! Flash toasts carried across the redirect that follows a form submission.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use emporium_core::Toast;
use tower_sessions::Session;

use crate::models::session_keys;

/// Pending toasts, drained from the session when extracted.
///
/// ```rust,ignore
/// async fn show(Flash(toasts): Flash) -> impl IntoResponse {
///     CartShowTemplate { toasts, .. }
/// }
/// ```
#[derive(Debug, Default)]
pub struct Flash(pub Vec<Toast>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let toasts = session
            .remove::<Vec<Toast>>(session_keys::TOASTS)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read toasts from session");
                None
            })
            .unwrap_or_default();
        Ok(Self(toasts))
    }
}

/// Queue a toast for the next rendered page.
pub async fn push_toast(session: &Session, toast: Toast) {
    let mut toasts = session
        .get::<Vec<Toast>>(session_keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    toasts.push(toast);

    if let Err(e) = session.insert(session_keys::TOASTS, toasts).await {
        tracing::error!(error = %e, "Failed to store toast in session");
    }
}
