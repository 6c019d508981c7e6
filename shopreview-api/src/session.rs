use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use shopreview_app::domain::Session;
use shopreview_app::AppContext;
use shopreview_errors::AppError;

/// Caller's session from the `Authorization: Bearer` header.
///
/// No header means an anonymous caller. A header that does not carry a valid token is
/// rejected with 401 instead of silently falling back to anonymous.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn as_ref(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppContext> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        ctx.sessions.verify(token).map(|session| Self(Some(session)))
    }
}
