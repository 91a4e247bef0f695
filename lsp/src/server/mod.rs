mod cli;
mod completion;
mod config;
mod convert;
mod entry;
mod handlers;
mod state;
mod text;
mod utils;

pub use entry::run;

#[cfg(test)]
mod cli_test;
