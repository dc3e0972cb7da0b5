mod files;
mod root;
mod tags;

pub use root::Cli;
