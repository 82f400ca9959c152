//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use ddup_core::types::UserId;
use ddup_entity::organization::{OrgRole, UpdateOrganization};
use ddup_service::{CreateOrganizationRequest, RegisterRequest};

/// Registration request body.
///
/// The character rules for usernames and the password policy are enforced
/// by the user service; these checks only reject obviously bad input early.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterBody {
    /// Username.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Nickname; defaults to the username.
    #[validate(length(max = 64))]
    pub nickname: Option<String>,
    /// Email.
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,
}

impl From<RegisterBody> for RegisterRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            username: body.username,
            password: body.password,
            nickname: body.nickname,
            email: body.email,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Organization creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationBody {
    /// Slug.
    #[validate(length(min = 2, max = 40))]
    pub name: String,
    /// Display name.
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Contact email.
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    /// Website.
    #[validate(url, length(max = 255))]
    pub website: Option<String>,
}

impl From<CreateOrganizationBody> for CreateOrganizationRequest {
    fn from(body: CreateOrganizationBody) -> Self {
        Self {
            name: body.name,
            display_name: body.display_name,
            description: body.description,
            email: body.email,
            website: body.website,
        }
    }
}

/// Partial organization update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizationBody {
    /// New slug.
    #[validate(length(min = 2, max = 40))]
    pub name: Option<String>,
    /// New display name.
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    /// New description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// New contact email.
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    /// New website.
    #[validate(url, length(max = 255))]
    pub website: Option<String>,
}

impl From<UpdateOrganizationBody> for UpdateOrganization {
    fn from(body: UpdateOrganizationBody) -> Self {
        Self {
            name: body.name,
            display_name: body.display_name,
            description: body.description,
            email: body.email,
            website: body.website,
        }
    }
}

/// Add a member to an organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: UserId,
    /// Initial role.
    #[serde(default = "default_role")]
    pub role: OrgRole,
}

/// Change a member's role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMemberRoleRequest {
    /// New role.
    pub role: OrgRole,
}

fn default_role() -> OrgRole {
    OrgRole::Member
}
