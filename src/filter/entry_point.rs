// Helpers for handlers that need the authentication left by the filter

use http::{Request, Response, StatusCode};

use super::Authentication;

/// The authentication stored by the filter, if any.
pub fn authentication<B>(request: &Request<B>) -> Option<&Authentication> {
    request.extensions().get::<Authentication>()
}

/// The stored authentication, or a `401 Unauthorized` response to send back.
pub fn require_authentication<B>(request: &Request<B>) -> Result<&Authentication, Response<String>> {
    authentication(request).ok_or_else(unauthorized)
}

/// `401` with the reason phrase as body.
pub fn unauthorized() -> Response<String> {
    let status = StatusCode::UNAUTHORIZED;
    let reason = status.canonical_reason().unwrap_or("Unauthorized");
    tracing::debug!(
        code = status.as_u16(),
        message = reason,
        "sending unauthorized response"
    );

    let mut response = Response::new(reason.to_string());
    *response.status_mut() = status;
    response
}
