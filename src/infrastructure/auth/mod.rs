//! Token infrastructure

mod jwt;

pub use jwt::{AccessClaims, TokenConfig, TokenService};
