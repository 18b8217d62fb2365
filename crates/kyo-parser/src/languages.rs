//! Language tags: aliases, executability, and default timeouts.

use std::collections::BTreeMap;

use kyo_config::TaskConfig;

/// Languages a runner can execute.
const EXECUTABLE: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "ruby",
    "go",
    "rust",
    "java",
    "c",
    "cpp",
    "bash",
    "zsh",
    "fish",
    "powershell",
    "sql",
    "r",
    "scala",
    "kotlin",
    "swift",
    "php",
];

/// Recognized languages that produce tasks which are never executed.
const DESCRIPTIVE: &[&str] = &[
    "json",
    "yaml",
    "toml",
    "xml",
    "html",
    "css",
    "scss",
    "markdown",
    "dockerfile",
    "make",
    "ini",
    "csv",
    "graphql",
    "diff",
    "hcl",
    "nix",
    "protobuf",
    "elixir",
    "erlang",
    "haskell",
    "lua",
    "perl",
    "julia",
    "dart",
    "zig",
    "ocaml",
    "clojure",
    "csharp",
    "fsharp",
    "groovy",
    "latex",
];

/// Tags that mark a fence as plain text.
const PLAIN: &[&str] = &[
    "text",
    "txt",
    "plain",
    "plaintext",
    "output",
    "console",
    "none",
];

/// Default per-language timeouts in seconds. Shells are quick, compiled
/// toolchains need room for a build.
const DEFAULT_TIMEOUTS: &[(&str, u32)] = &[
    ("bash", 30),
    ("zsh", 30),
    ("fish", 30),
    ("powershell", 30),
    ("python", 60),
    ("javascript", 60),
    ("ruby", 60),
    ("php", 60),
    ("r", 60),
    ("sql", 60),
    ("typescript", 90),
    ("go", 120),
    ("c", 120),
    ("swift", 120),
    ("java", 180),
    ("cpp", 180),
    ("kotlin", 180),
    ("scala", 180),
    ("rust", 300),
];

/// Map an alias to its canonical tag. Input must already be lowercase.
#[must_use]
pub fn canonicalize(tag: &str) -> &str {
    match tag {
        "py" | "python3" => "python",
        "js" | "node" | "nodejs" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "sh" | "shell" => "bash",
        "rb" => "ruby",
        "golang" => "go",
        "rs" => "rust",
        "c++" | "cxx" | "cc" => "cpp",
        "ps1" | "pwsh" | "ps" => "powershell",
        "kt" | "kts" => "kotlin",
        "yml" => "yaml",
        "md" => "markdown",
        "htm" => "html",
        "jsonc" | "json5" => "json",
        "docker" => "dockerfile",
        "makefile" => "make",
        "ex" | "exs" => "elixir",
        "hs" => "haskell",
        "pl" => "perl",
        "cs" | "c#" => "csharp",
        "proto" => "protobuf",
        "tex" => "latex",
        other => other,
    }
}

/// How a fence's language tag affects task extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageClass {
    /// No tag, or a plain-text marker. Never a task.
    Plain,
    /// A tag nobody recognizes. Never a task.
    Unknown(String),
    /// Becomes a task.
    Known { canonical: String, executable: bool },
}

impl LanguageClass {
    #[must_use]
    pub const fn is_task(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

/// Language lookups with configured timeout overrides applied.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    default_timeout: u32,
    timeouts: BTreeMap<String, u32>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(&TaskConfig::default())
    }
}

impl LanguageTable {
    #[must_use]
    pub fn new(config: &TaskConfig) -> Self {
        let mut timeouts: BTreeMap<String, u32> = DEFAULT_TIMEOUTS
            .iter()
            .map(|(lang, secs)| ((*lang).to_string(), *secs))
            .collect();
        for (lang, secs) in &config.timeouts {
            let lang = lang.to_ascii_lowercase();
            timeouts.insert(canonicalize(&lang).to_string(), *secs);
        }
        Self {
            default_timeout: config.default_timeout_secs,
            timeouts,
        }
    }

    /// Classify a fence language tag (lowercase, as parsed from the info string).
    #[must_use]
    pub fn classify(&self, tag: Option<&str>) -> LanguageClass {
        let Some(tag) = tag.filter(|t| !t.is_empty()) else {
            return LanguageClass::Plain;
        };
        if PLAIN.contains(&tag) {
            return LanguageClass::Plain;
        }
        let canonical = canonicalize(tag);
        let executable = EXECUTABLE.contains(&canonical);
        if executable || DESCRIPTIVE.contains(&canonical) {
            LanguageClass::Known {
                canonical: canonical.to_string(),
                executable,
            }
        } else {
            LanguageClass::Unknown(tag.to_string())
        }
    }

    /// Timeout for a canonical language tag.
    #[must_use]
    pub fn timeout_for(&self, canonical: &str) -> u32 {
        self.timeouts
            .get(canonical)
            .copied()
            .unwrap_or(self.default_timeout)
    }
}
