use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::gate::Caller;
use crate::resp::problem::{problems, Problem};

pub static ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Verified caller token. Tokens carry `{ user: { username, role } }` and an
/// optional `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerToken {
    pub user: Caller,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl CallerToken {
    pub fn new(user: Caller) -> CallerToken {
        CallerToken { user, exp: None }
    }

    pub fn encode_jwt(&self, secret: impl AsRef<[u8]>) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, &self, &EncodingKey::from_secret(secret.as_ref()))
    }

    pub fn decode_jwt(token: &str, secret: impl AsRef<[u8]>) -> Result<CallerToken, Problem> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();

        let data = decode::<CallerToken>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Raw token from `Authorization` (with or without the `Bearer` scheme) or
/// `x-access-token`.
pub fn extract_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    let headers = req.headers();
    headers
        .get_one(ACCESS_TOKEN_HEADER)
        .or_else(|| {
            headers
                .get_one("Authorization")
                .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CallerToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = match req.rocket().state::<Config>() {
            Some(it) => it,
            None => {
                tracing::error!("configuration isn't managed; unable to verify tokens");
                return Error((Status::InternalServerError, problems::not_configured()));
            }
        };

        tracing::trace!("extracting caller token from request headers");
        let token = match extract_token(req) {
            Some(it) => it,
            None => {
                return Error((
                    Status::Unauthorized,
                    problems::unauthorized("No access token provided."),
                ))
            }
        };

        match CallerToken::decode_jwt(token, &config.jwt_secret) {
            Ok(claims) => {
                tracing::debug!("decoded caller token for user: {}", claims.user.username);
                Success(claims)
            }
            Err(e) => {
                tracing::debug!("unable to decode caller token: {}", e);
                Error((Status::Unauthorized, e))
            }
        }
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> SecurityScheme {
            let mut http = Http::new(HttpAuthScheme::Bearer);
            http.bearer_format = Some("JWT".to_string());
            SecurityScheme::Http(http)
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(c) = openapi.components.as_mut() {
                c.add_security_scheme("jwt", *self)
            }
        }
    }
}


/// Signs a caller token with the managed secret.
#[cfg(test)]
pub fn bearer(user: crate::gate::Caller, secret: &str) -> rocket::http::Header<'static> {
    let token = CallerToken::new(user)
        .encode_jwt(secret)
        .expect("unable to encode caller token");
    rocket::http::Header::new("Authorization", format!("Bearer {}", token))
}
