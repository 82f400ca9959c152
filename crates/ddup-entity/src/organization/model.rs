//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ddup_core::AppError;
use ddup_core::types::{OrganizationId, UserId};

/// Maximum organization name length.
pub const MAX_NAME_LENGTH: usize = 40;

/// A tenant grouping of users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: OrganizationId,
    /// Unique URL-safe slug.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Public website.
    pub website: Option<String>,
    /// The user who created the organization.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Check an organization slug: lowercase letters, digits, and inner
/// hyphens, 2 to 40 characters, starting and ending alphanumeric.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 2 || bytes.len() > MAX_NAME_LENGTH {
        return false;
    }
    let edge = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let inner = |b: u8| edge(b) || b == b'-';

    edge(bytes[0]) && edge(bytes[bytes.len() - 1]) && bytes.iter().all(|b| inner(*b))
}

/// Validate an organization slug, returning a validation error on failure.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid organization name '{name}': use 2-{MAX_NAME_LENGTH} lowercase letters, digits, or hyphens, starting and ending with a letter or digit"
        )))
    }
}

/// Data required to create an organization.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    /// Slug.
    pub name: String,
    /// Display name, defaults to the slug.
    pub display_name: String,
    /// Description.
    pub description: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Website.
    pub website: Option<String>,
    /// Creator; becomes the first admin.
    pub created_by: UserId,
}

impl NewOrganization {
    /// Create a payload whose display name mirrors the slug.
    pub fn new(name: impl Into<String>, created_by: UserId) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: None,
            email: None,
            website: None,
            created_by,
        }
    }
}

/// Partial update of the descriptive fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrganization {
    /// New slug; must pass [`validate_name`] and stay unique.
    pub name: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New website.
    pub website: Option<String>,
}

impl UpdateOrganization {
    /// Whether the update touches nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.display_name.is_none()
            && self.description.is_none()
            && self.email.is_none()
            && self.website.is_none()
    }

    /// Apply the update to an organization in place.
    pub fn apply_to(&self, org: &mut Organization) {
        if let Some(v) = &self.name {
            org.name = v.clone();
        }
        if let Some(v) = &self.display_name {
            org.display_name = v.clone();
        }
        if let Some(v) = &self.description {
            org.description = Some(v.clone());
        }
        if let Some(v) = &self.email {
            org.email = Some(v.clone());
        }
        if let Some(v) = &self.website {
            org.website = Some(v.clone());
        }
    }
}
