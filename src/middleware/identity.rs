use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Header the upstream authentication layer uses to forward the user
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user behind a request, if any
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

impl Caller {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }

    /// The user id, or `Unauthorized` for anonymous callers
    pub fn require(&self) -> AppResult<Uuid> {
        self.0.ok_or(AppError::Unauthorized)
    }
}

/// Resolves the caller from `x-user-id`; a missing or malformed value is anonymous.
pub async fn caller_identity_middleware(mut request: Request, next: Next) -> Response {
    let caller = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(|id| Caller(Some(id)))
        .unwrap_or_default();

    request.extensions_mut().insert(caller);
    next.run(request).await
}
