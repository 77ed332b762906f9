pub mod client;
mod dto;
pub mod extract;
pub mod handlers;
pub mod prompts;
#[cfg(test)]
pub mod testing;
