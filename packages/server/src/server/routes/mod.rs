pub mod auth;
pub mod health;
pub mod messages;
pub mod profiles;

pub use auth::{login_handler, me_handler, register_handler};
pub use health::health_handler;
pub use messages::{dialogs_handler, send_handler, unread_handler};
pub use profiles::{
    list_profiles_handler, start_auth_handler, verify_code_handler, verify_password_handler,
};
