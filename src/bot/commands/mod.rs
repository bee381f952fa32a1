pub mod admin;
pub mod confession;
pub mod general;
pub mod setup;
