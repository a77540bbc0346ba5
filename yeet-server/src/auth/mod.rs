pub mod oauth;
pub mod password;
pub mod token;

pub use oauth::{derive_username, GoogleOAuthConfig, GoogleUser};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
pub use token::{Claims, TokenError, TokenPair, TokenService, TokenType};
