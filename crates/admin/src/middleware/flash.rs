//! Flash toasts carried across the redirect that follows a form submission.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use emporium_core::Toast;
use tower_sessions::Session;

/// Session key holding pending toasts.
pub const TOASTS_KEY: &str = "admin_toasts";

/// Pending toasts, drained from the session when extracted.
#[derive(Debug, Default)]
pub struct Flash(pub Vec<Toast>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let toasts = match session.remove::<Vec<Toast>>(TOASTS_KEY).await {
            Ok(toasts) => toasts.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read toasts from session");
                Vec::new()
            }
        };
        Ok(Self(toasts))
    }
}

/// Queue a toast for the next rendered page.
pub async fn push_toast(session: &Session, toast: Toast) {
    let mut toasts = session
        .get::<Vec<Toast>>(TOASTS_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    toasts.push(toast);

    if let Err(e) = session.insert(TOASTS_KEY, toasts).await {
        tracing::error!(error = %e, "Failed to store toast in session");
    }
}
