use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{AuthContext, TokenCodec};

/// Attach an `AuthContext` to the request when the bearer token parses.
///
/// Never rejects. A missing or bad token leaves the request anonymous and
/// the handler's allow-list decides what that means.
pub async fn auth_context_middleware(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    match bearer_token(request.headers()) {
        Ok(token) => match codec.parse(token) {
            Ok(claims) => {
                let context = AuthContext::from(claims);
                debug!(
                    "Request identity {} ({})",
                    context.subject_id(),
                    context.subject_role()
                );
                request.extensions_mut().insert(context);
            }
            Err(e) => debug!("Ignoring unusable bearer token: {}", e),
        },
        Err(reason) => debug!("No identity attached: {}", reason),
    }

    next.run(request).await
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes_and_blanks() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers("Basic dXNlcjpwdw==")).is_err());
        assert!(bearer_token(&headers("Bearer   ")).is_err());
    }
}
