//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that need an authenticated caller take [`Principal`] as an
//! extractor argument; anonymous endpoints simply omit it. Extraction
//! resolves the `Authorization: Bearer` header through the token port, so
//! handlers receive an explicit principal and never read ambient state.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::TokenServiceError;
use crate::domain::{Error, UserId};
use crate::inbound::http::ApiError;
use crate::inbound::http::state::HttpState;

/// The authenticated identity making this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
}

impl Principal {
    /// The principal's account id, passed explicitly into every service
    /// call.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(Error::unauthorized("authentication required"));
    };
    let value = value
        .to_str()
        .map_err(|_| Error::unauthorized("invalid authorization header"))?;
    let Some(token) = value.strip_prefix("Bearer ") else {
        return Err(Error::unauthorized("invalid authorization header"));
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::unauthorized("invalid authorization header"));
    }
    Ok(token.to_owned())
}

fn map_token_error(error: TokenServiceError) -> Error {
    match error {
        TokenServiceError::Connection { message } => {
            Error::service_unavailable(format!("token store unavailable: {message}"))
        }
        TokenServiceError::Query { message } => {
            Error::internal(format!("token store error: {message}"))
        }
    }
}

impl FromRequest for Principal {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token = bearer_token(&req).map_err(ApiError::from)?;
            let state = req
                .app_data::<web::Data<HttpState>>()
                .ok_or_else(|| ApiError::from(Error::internal("HTTP state not configured")))?;
            let user_id = state
                .tokens
                .resolve_access(&token)
                .await
                .map_err(|err| ApiError::from(map_token_error(err)))?
                .ok_or_else(|| ApiError::from(Error::unauthorized("invalid or expired token")))?;
            Ok(Principal { user_id })
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn missing_header_requires_authentication() {
        let req = TestRequest::default().to_http_request();
        let err = bearer_token(&req).expect_err("missing header must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "authentication required");
    }

    #[rstest]
    #[case("Basic dXNlcjpwdw==")]
    #[case("Bearer")]
    #[case("Bearer   ")]
    #[case("token-without-scheme")]
    fn malformed_headers_are_rejected(#[case] value: &str) {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, value))
            .to_http_request();
        let err = bearer_token(&req).expect_err("malformed header must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid authorization header");
    }

    #[rstest]
    fn well_formed_header_yields_the_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        let token = bearer_token(&req).expect("valid header");
        assert_eq!(token, "abc123");
    }
}
