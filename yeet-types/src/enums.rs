use serde::{Deserialize, Serialize};

/// Which relation `GET /api/user/{username}/{checkInfo}/` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInfoKind {
    /// Usernames the user follows
    Follows,
    /// Usernames following the user
    Following,
    /// Contents of the user's posts
    Posts,
}

impl UserInfoKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Follows" => Some(UserInfoKind::Follows),
            "Following" => Some(UserInfoKind::Following),
            "Posts" => Some(UserInfoKind::Posts),
            _ => None,
        }
    }
}

/// State reported by a toggle endpoint after the flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleStatus {
    Followed,
    Unfollowed,
    Liked,
    Unliked,
    Reyeeted,
    Unreyeeted,
}

impl ToggleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleStatus::Followed => "followed",
            ToggleStatus::Unfollowed => "unfollowed",
            ToggleStatus::Liked => "liked",
            ToggleStatus::Unliked => "unliked",
            ToggleStatus::Reyeeted => "reyeeted",
            ToggleStatus::Unreyeeted => "unreyeeted",
        }
    }
}
