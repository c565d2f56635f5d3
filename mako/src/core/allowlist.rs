//! Allow-list for the read-only shell tool.

/// Command prefixes the shell tool may run. Multi-word entries pin a git
/// subcommand.
pub const SAFE_PREFIXES: &[&str] = &[
    "ls",
    "dir",
    "tree",
    "find",
    "grep",
    "rg",
    "cat",
    "head",
    "tail",
    "wc",
    "git status",
    "git diff",
    "git log",
    "git branch",
    "git remote",
];

/// Return the matching prefix if `cmd` starts with an allowed command.
///
/// A prefix only matches on a word boundary: `lsof` does not match `ls`.
pub fn allowed_prefix(cmd: &str) -> Option<&'static str> {
    let cmd = cmd.trim();
    SAFE_PREFIXES.iter().copied().find(|prefix| {
        cmd.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}
