pub mod permission_model;
pub mod role;
