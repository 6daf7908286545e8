pub mod capability_guard;
