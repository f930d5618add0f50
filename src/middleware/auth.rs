//! Middleware de identidad
//!
//! La autenticación y el manejo de sesión viven fuera de este servicio;
//! el gateway verifica la sesión y reenvía la identidad en headers. Aquí
//! solo se parsean esos headers y se inyecta el usuario como extensión de
//! la request.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::errors::AppError;

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Roles con acceso a la administración de viajes, rutas y vehículos
    pub fn can_manage(&self) -> bool {
        matches!(self.role, UserRole::Owner | UserRole::Operator)
    }

    fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = parse_uuid_header(headers, "x-user-id")?;
        let company_id = parse_uuid_header(headers, "x-company-id")?;
        let role = headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| AppError::Unauthorized("Rol de usuario requerido".to_string()))?;

        Ok(Self {
            user_id,
            company_id,
            role,
        })
    }
}

fn parse_uuid_header(headers: &HeaderMap, name: &str) -> Result<Uuid, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Header {} requerido", name)))
}

/// Middleware que materializa la identidad reenviada por el gateway
pub async fn identity_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = AuthenticatedUser::from_headers(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(user: &str, company: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(user).unwrap());
        headers.insert("x-company-id", HeaderValue::from_str(company).unwrap());
        headers.insert("x-user-role", HeaderValue::from_str(role).unwrap());
        headers
    }

    #[test]
    fn test_identity_from_forwarded_headers() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let headers = headers(&user_id.to_string(), &company_id.to_string(), "checker");

        let user = AuthenticatedUser::from_headers(&headers).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.company_id, company_id);
        assert_eq!(user.role, UserRole::Checker);
        assert!(!user.can_manage());
    }

    #[test]
    fn test_missing_or_invalid_headers_are_unauthorized() {
        let incomplete = HeaderMap::new();
        assert!(AuthenticatedUser::from_headers(&incomplete).is_err());

        let bad_role = headers(
            &Uuid::new_v4().to_string(),
            &Uuid::new_v4().to_string(),
            "superadmin",
        );
        assert!(AuthenticatedUser::from_headers(&bad_role).is_err());
    }
}
