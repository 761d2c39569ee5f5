pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::JwtManager;
pub use middleware::CurrentUser;
