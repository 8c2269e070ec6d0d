pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod services;

#[cfg(test)]
mod test_support;
