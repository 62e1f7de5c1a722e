pub mod commands;
pub mod llm;
pub mod palette;
pub mod question;
pub mod session;
pub mod tui;
pub mod utils;
