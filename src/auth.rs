//! Bearer-token authentication for the JSON API.
//!
//! Tokens are HS256 JWTs signed with `jwt_secret` from [`ServerConfig`].

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::types::UserId;
use crate::dto::application::ErrorBody;
use crate::models::config::ServerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    /// Claims for `user` valid for `ttl` from now.
    pub fn for_user(user: &AuthenticatedUser, ttl: Duration) -> Self {
        let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp,
        }
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = crate::domain::types::TypeConstraintError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(claims.sub)?,
            email: claims.email,
            name: claims.name.filter(|n| !n.trim().is_empty()),
            role: claims.role,
        })
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

fn unauthorized(message: &str) -> actix_web::Error {
    InternalError::from_response(
        message.to_string(),
        HttpResponse::Unauthorized().json(ErrorBody::new(message)),
    )
    .into()
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("Server configuration is not registered");
        return Err(actix_web::error::ErrorInternalServerError("configuration missing"));
    };
    let token = bearer_token(req).ok_or_else(|| unauthorized("Unauthorized"))?;
    let claims = decode_token(token, &config.jwt_secret).map_err(|err| {
        log::warn!("Rejected bearer token: {err}");
        unauthorized("Invalid or expired token")
    })?;
    AuthenticatedUser::try_from(claims).map_err(|_| unauthorized("Invalid or expired token"))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
