pub mod client;
pub mod code;
pub mod compile;
pub mod config;
pub mod lang;
pub mod session;
pub mod terminal;
pub mod theme;
