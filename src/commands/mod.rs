pub mod assume;
pub mod completions;

pub use assume::{AssumeCommand, OutputFormat};
pub use completions::CompletionsCommand;
