//! Modelo de User
//!
//! Este módulo contiene el struct User y el rol dentro de la empresa.
//! Los dueños de empresa y los choferes son ambos usuarios; el registro
//! del dueño lleva la identidad pública de la empresa (nombre y logo
//! mostrados en los resultados de búsqueda).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Operator,
    Driver,
    Checker,
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(UserRole::Owner),
            "operator" => Ok(UserRole::Operator),
            "driver" => Ok(UserRole::Driver),
            "checker" => Ok(UserRole::Checker),
            _ => Err(()),
        }
    }
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("owner".parse::<UserRole>(), Ok(UserRole::Owner));
        assert_eq!("checker".parse::<UserRole>(), Ok(UserRole::Checker));
        assert!("admin".parse::<UserRole>().is_err());
    }
}
