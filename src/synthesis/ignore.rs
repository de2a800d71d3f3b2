//! Build-context exclusion list

pub const IGNORE_FILE: &str = ".dockerignore";

/// Applied to every repository regardless of the detected stack
pub const IGNORE_PATTERNS: &[&str] = &[
    // dependency caches
    "node_modules",
    "**/node_modules",
    "vendor",
    "__pycache__",
    "**/__pycache__",
    "*.pyc",
    ".venv",
    "venv",
    // build outputs
    "build",
    "dist",
    "coverage",
    // logs
    "logs",
    "*.log",
    "npm-debug.log*",
    // secrets
    ".env",
    ".env.*",
    // editor and VCS metadata
    ".git",
    ".gitignore",
    ".vscode",
    ".idea",
    ".DS_Store",
    "*.swp",
];

pub fn render() -> String {
    let mut out = IGNORE_PATTERNS.join("\n");
    out.push('\n');
    out
}
