use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Poll categories. Anything outside the fixed set falls back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Politics,
    Technology,
    Culture,
    Climate,
    Custom,
}

impl Category {
    pub fn parse(input: Option<&str>) -> Category {
        match input {
            Some("general") => Category::General,
            Some("politics") => Category::Politics,
            Some("technology") => Category::Technology,
            Some("culture") => Category::Culture,
            Some("climate") => Category::Climate,
            Some("custom") => Category::Custom,
            _ => Category::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Politics => "politics",
            Category::Technology => "technology",
            Category::Culture => "culture",
            Category::Climate => "climate",
            Category::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub category: String,
    pub custom_category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub poll_id: String,
    #[serde(skip_serializing)]
    pub ip_address: String,
    #[serde(skip_serializing)]
    pub device_fingerprint: String,
    pub answer: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub poll_id: String,
    pub content: String,
    pub answer: bool,
    #[serde(skip_serializing)]
    pub ip_address: String,
    #[serde(skip_serializing)]
    pub device_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_falls_back_to_general() {
        assert_eq!(Category::parse(None), Category::General);
        assert_eq!(Category::parse(Some("sports")), Category::General);
        assert_eq!(Category::parse(Some("")), Category::General);
    }

    #[test]
    fn category_accepts_fixed_set() {
        for name in ["general", "politics", "technology", "culture", "climate", "custom"] {
            assert_eq!(Category::parse(Some(name)).as_str(), name);
        }
    }
}
