pub mod dto;
pub mod handlers;
mod quantity;
pub mod repo_types;
pub mod services;
mod unify;
