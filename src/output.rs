//! Console printing: the token on stdout, everything else on stderr.

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::services::DebugSink;

pub const TOKEN_LABEL: &str = "ACCESS TOKEN:";

#[derive(Clone, Copy, Debug)]
pub struct Console {
    colored: bool,
    quiet: bool,
}

impl Console {
    pub fn new(colored: bool, quiet: bool) -> Self {
        Self { colored, quiet }
    }

    pub fn token(&self, token: &str) {
        println!("{}", self.render_token(token));
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.render_warning(message));
    }

    pub fn error(&self, error: &dyn std::error::Error) {
        eprintln!("{}", self.render_error(error));
    }

    fn render_token(&self, token: &str) -> String {
        match (self.quiet, self.colored) {
            (true, _) => token.to_string(),
            (false, true) => format!("\n{}\n{}\n", TOKEN_LABEL.bold(), token.green().bold()),
            (false, false) => format!("\n{TOKEN_LABEL}\n{token}\n"),
        }
    }

    fn render_warning(&self, message: &str) -> String {
        if self.colored {
            format!("{}: {}", "Warning".bright_yellow().bold(), message.yellow())
        } else {
            format!("Warning: {message}")
        }
    }

    fn render_error(&self, error: &dyn std::error::Error) -> String {
        let mut text = error.to_string();
        let mut cause = error.source();
        while let Some(inner) = cause {
            let inner_text = inner.to_string();
            // thiserror messages usually embed their source already
            if !text.contains(&inner_text) {
                text.push_str(&format!("\n  caused by: {inner_text}"));
            }
            cause = inner.source();
        }

        if self.colored {
            format!("{}: {}", "Error".bright_red().bold(), text.red())
        } else {
            format!("Error: {text}")
        }
    }

    fn render_debug(&self, label: &str, value: &Value) -> String {
        let pretty = match value {
            // non-JSON bodies are passed through as text
            Value::String(text) => text.clone(),
            _ => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        };
        if self.colored {
            format!("\n{}\n{}", label.bright_blue().bold(), pretty.blue())
        } else {
            format!("\n{label}\n{pretty}")
        }
    }
}

impl DebugSink for Console {
    fn emit(&self, label: &str, value: &Value) {
        eprintln!("{}", self.render_debug(label, value));
    }
}
