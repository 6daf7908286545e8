pub mod auth;
pub mod gate;
pub mod jwt;
pub mod rbac;
