use chrono::{DateTime, Utc};
use domain_roles::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User gender
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Company the user belongs to, embedded in user responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyRef {
    pub id: i64,
    pub name: String,
}

/// Role assigned to the user, embedded in user responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleRef {
    pub id: i64,
    pub name: String,
}

/// User entity as exposed over the API.
///
/// The password hash and refresh token live only on the database row and in
/// [`AuthUser`]; they never serialize into responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub company: Option<CompanyRef>,
    pub role: Option<RoleRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    /// Referenced company; unknown ids are stored as null
    pub company_id: Option<i64>,
    /// Referenced role; unknown ids are stored as null
    pub role_id: Option<i64>,
}

/// DTO for updating an existing user. Email and password cannot change here.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub company_id: Option<i64>,
    pub role_id: Option<i64>,
}

impl User {
    /// Apply the scalar updates from UpdateUser; company and role refs are
    /// resolved by the repository.
    pub fn apply_update(&mut self, update: &UpdateUser, actor: Option<String>) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
        if let Some(ref address) = update.address {
            self.address = Some(address.clone());
        }
        self.updated_at = Some(Utc::now());
        self.updated_by = actor;
    }
}

/// Credential view of a user, loaded for login and token refresh.
///
/// Carries the full role (with permissions) for the request guard.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub role: Option<Role>,
}

/// Login request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address used as the login name
    #[validate(email)]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// User identity returned from login, refresh and account endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Option<RoleRef>,
}

/// Login and refresh response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: AccountUser,
}

/// Public self-registration request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
}

impl From<RegisterRequest> for CreateUser {
    fn from(input: RegisterRequest) -> Self {
        CreateUser {
            name: input.name,
            email: input.email,
            password: input.password,
            age: input.age,
            gender: input.gender,
            address: input.address,
            company_id: None,
            role_id: None,
        }
    }
}

impl AuthUser {
    pub fn account_user(&self) -> AccountUser {
        AccountUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.as_ref().map(|r| RoleRef {
                id: r.id,
                name: r.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_serializes_screaming() {
        let json = serde_json::to_string(&Gender::Male).unwrap();
        assert_eq!(json, r#""MALE""#);

        let parsed: Gender = serde_json::from_str(r#""OTHER""#).unwrap();
        assert_eq!(parsed, Gender::Other);
    }

    #[test]
    fn test_gender_round_trips_through_strings() {
        use std::str::FromStr;

        assert_eq!(Gender::Female.to_string(), "FEMALE");
        assert_eq!(Gender::from_str("FEMALE").unwrap(), Gender::Female);
    }

    #[test]
    fn test_user_never_exposes_credentials() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            age: None,
            gender: None,
            address: None,
            company: None,
            role: None,
            created_at: Utc::now(),
            updated_at: None,
            created_by: None,
            updated_by: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("refresh_token"));
    }
}
