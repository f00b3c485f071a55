//! User domain
//!
//! Identity records, authorization scopes, search predicates, and the
//! directory trait the service layer depends on.

mod entity;
mod filter;
mod repository;
mod scope;
mod validation;

pub use entity::UserInfo;
pub use filter::UserFilter;
pub use repository::UserDirectory;
pub use scope::{has_required_scope, UserScope};
pub use validation::{
    validate_name, validate_password, validate_username, UserValidationError,
};
