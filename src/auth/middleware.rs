use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use serde_json::{Value, json};

/// Reason a request is turned away with 401 before any handler runs.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    MissingHeader,
    NotBearer,
    BadToken(String),
    UnknownRole(u8),
}

impl Rejection {
    fn body(&self) -> Value {
        match self {
            Rejection::MissingHeader => json!({"error": "Missing Authorization header"}),
            Rejection::NotBearer => {
                json!({"error": "Authorization header must be 'Bearer <token>'"})
            }
            Rejection::BadToken(details) => {
                json!({"error": "Invalid or expired token", "details": details})
            }
            Rejection::UnknownRole(role) => json!({"error": "Invalid role", "role": role}),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers.get(AUTHORIZATION).ok_or(Rejection::MissingHeader)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::NotBearer)
}

/// Turns a verified access token into the caller identity handlers extract.
fn authenticate(token: &str, secret: &str) -> Result<AuthUser, Rejection> {
    let claims = verify_token(token, secret).map_err(Rejection::BadToken)?;
    let role = Role::from_id(claims.role).ok_or(Rejection::UnknownRole(claims.role))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
        department_id: claims.department_id,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let outcome =
        bearer_token(req.headers()).and_then(|token| authenticate(token, &config.jwt_secret));

    match outcome {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(rejection) => {
            tracing::debug!(path = %req.path(), ?rejection, "Request rejected");
            let resp = HttpResponse::Unauthorized().json(rejection.body());
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
