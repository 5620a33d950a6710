//! Operator-facing console output and prompts.

use std::io::{self, BufRead, IsTerminal, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Colored console writer. Colors are dropped when stdout is not a terminal.
#[derive(Debug, Clone)]
pub struct Console {
    color: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    /// Console that never emits escape codes
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn header(&self, text: &str) {
        println!();
        println!("{}", self.paint(&format!("{BOLD}{MAGENTA}"), &format!("--- {text} ---")));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.paint(CYAN, &format!(">> {message}")));
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.paint(GREEN, &format!("\u{2714}  {message}")));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.paint(YELLOW, &format!("\u{26a0}  {message}")));
    }

    pub fn error(&self, message: &str) {
        println!("{}", self.paint(RED, &format!("\u{2716}  {message}")));
    }

    pub fn item(&self, index: impl std::fmt::Display, text: &str) {
        println!("  {}", self.paint(BOLD, &format!("{index}. {text}")));
    }

    /// Ask a question on stdin. A closed or broken stdin yields `default`.
    pub fn prompt(&self, question: &str, default: &str) -> String {
        print!("{} ", self.paint(YELLOW, &format!("? {question}")));
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!();
                self.warning("No input available; using default response.");
                default.to_string()
            }
            Ok(_) => line.trim().to_string(),
        }
    }
}

/// Parse a selection like `1 3 4` or `all` into zero-based indices.
///
/// Numbers are 1-based on screen; entries outside `1..=count` and non-numbers
/// are reported through `console` and dropped.
pub fn parse_selection(console: &Console, input: &str, count: usize) -> Vec<usize> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return (0..count).collect();
    }

    let mut indices = Vec::new();
    for token in input.split_whitespace() {
        match token.parse::<usize>() {
            Ok(n) if n >= 1 && n <= count => {
                if !indices.contains(&(n - 1)) {
                    indices.push(n - 1);
                }
            }
            Ok(_) => console.warning(&format!("Index out of range: {token}")),
            Err(_) => console.warning(&format!("Invalid number: {token}")),
        }
    }
    indices
}
