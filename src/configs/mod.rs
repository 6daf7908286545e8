pub mod initializer;
pub mod menu_config;
