// Presentation adapters: terminal output and confirmation prompts.

pub mod console;
