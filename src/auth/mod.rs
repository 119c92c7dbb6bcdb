// Authentication module
// Provides JWT-based login and role-gated staff account management

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    create_user_handler, delete_user_handler, get_user_handler, list_users_handler, login_handler,
    me_handler, update_user_handler,
};
pub use middleware::{AuthenticatedUser, RequireRole};
pub use models::{
    CreateUserRequest, LoginRequest, LoginResponse, Role, UpdateUserRequest, User, UserResponse,
};
pub use service::AuthService;
