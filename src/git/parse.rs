//! Parsers for the machine-readable output of the git commands we run.

/// Branch name from `git ls-remote --symref <remote> HEAD`.
///
/// The interesting line looks like `ref: refs/heads/main\tHEAD`. Anything
/// else (no symref line, a non-branch target) yields `None`.
pub fn symbolic_head(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.strip_prefix("ref: ")
            .and_then(|symref| symref.split_once('\t'))
            .filter(|(_, name)| name.trim() == "HEAD")
            .and_then(|(ref_path, _)| ref_path.strip_prefix("refs/heads/"))
            .filter(|branch| !branch.is_empty())
            .map(str::to_string)
    })
}

/// First commit hash of a `--format=%H` listing.
pub fn first_hash(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| is_hash(line))
        .map(str::to_string)
}

/// Commit hash from the header of `git blame --porcelain` output.
///
/// The first line is `<hash> <orig-line> <final-line> [<count>]`.
pub fn blame_hash(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .filter(|hash| is_hash(hash))
        .map(str::to_string)
}

/// Whether git's stderr says a revision in the command line doesn't exist.
pub fn is_unknown_revision(stderr: &str) -> bool {
    stderr.contains("unknown revision") || stderr.contains("bad revision")
}

/// Full SHA-1 or SHA-256 object name.
fn is_hash(s: &str) -> bool {
    (s.len() == 40 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}
