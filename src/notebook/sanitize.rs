//! Turning human notebook names into safe directory names.

use std::path::{Path, PathBuf};

/// Characters that are unsafe in a path segment on some platform.
const PATH_HOSTILE: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

/// Device names Windows refuses to use as file names.
const WINDOWS_RESERVED: &[&str] = &["con", "prn", "aux", "nul"];

/// Which platform's naming rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Convert a notebook name into a path segment that is safe for the
/// filesystem and for git, using the rules of the current platform.
pub fn sanitize(name: &str) -> String {
    sanitize_for(name, Platform::current())
}

/// Convert a notebook name into a path segment for the given platform.
pub fn sanitize_for(name: &str, platform: Platform) -> String {
    let mut out: String = name
        .chars()
        .filter_map(|c| {
            if is_separator_space(c) || PATH_HOSTILE.contains(&c) {
                Some('-')
            } else if is_stripped_control(c) {
                None
            } else {
                Some(c)
            }
        })
        .collect();

    // only a lone "." is rewritten; ".." passes through
    if out == "." {
        out = "dot".to_string();
    }

    if platform == Platform::Windows {
        let trimmed_len = out.trim_end_matches(['.', ' ']).len();
        out.truncate(trimmed_len);
        if is_windows_reserved(&out) {
            out.insert(0, '-');
        }
    }

    out
}

/// The sanitized `name` when it is usable as one directory entry.
///
/// Returns `None` when the name sanitizes to nothing, `.` or `..`.
pub fn path_segment(name: &str) -> Option<String> {
    let segment = sanitize(name);
    match segment.as_str() {
        "" | "." | ".." => None,
        _ => Some(segment),
    }
}

/// Sanitize only the final component of `path`.
pub fn normalize_notebook_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(base) => {
            let base = sanitize(&base.to_string_lossy());
            match path.parent() {
                Some(parent) => parent.join(base),
                None => PathBuf::from(base),
            }
        }
        None => path.to_path_buf(),
    }
}

// U+0085 is left to the control-character rule, U+FEFF counts as space
fn is_separator_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

fn is_stripped_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

// matches con, prn, aux, nul, com0-9 and lpt0-9, optionally followed by an
// extension, ignoring case
fn is_windows_reserved(segment: &str) -> bool {
    let stem = match segment.find('.') {
        Some(i) => &segment[..i],
        None => segment,
    };
    let stem = stem.to_ascii_lowercase();

    if WINDOWS_RESERVED.contains(&stem.as_str()) {
        return true;
    }

    let bytes = stem.as_bytes();
    bytes.len() == 4
        && (stem.starts_with("com") || stem.starts_with("lpt"))
        && bytes[3].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_hostile_characters() {
        assert_eq!(sanitize_for("Test Notebook", Platform::Unix), "Test-Notebook");
        assert_eq!(sanitize_for("a/b?c<d>e\\f:g*h|i\"j", Platform::Unix), "a-b-c-d-e-f-g-h-i-j");
        assert_eq!(sanitize_for("tab\there", Platform::Unix), "tab-here");
    }

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(sanitize_for("a\u{0}b\u{1b}c\u{7f}d\u{9f}e", Platform::Unix), "abcde");
        // U+00A0 is whitespace and becomes a hyphen rather than vanishing
        assert_eq!(sanitize_for("a\u{a0}b", Platform::Unix), "a-b");
        assert_eq!(sanitize_for("a\u{85}b\u{feff}c", Platform::Unix), "ab-c");
    }

    #[test]
    fn test_dot_names() {
        assert_eq!(sanitize_for(".", Platform::Unix), "dot");
        assert_eq!(sanitize_for("..", Platform::Unix), "..");
        assert_eq!(sanitize_for(".hidden", Platform::Unix), ".hidden");
    }

    #[test]
    fn test_windows_rules() {
        assert_eq!(sanitize_for("notes. . ", Platform::Windows), "notes.-.-");
        assert_eq!(sanitize_for("notes...", Platform::Windows), "notes");
        assert_eq!(sanitize_for("CON", Platform::Windows), "-CON");
        assert_eq!(sanitize_for("lpt1.md", Platform::Windows), "-lpt1.md");
        assert_eq!(sanitize_for("com10", Platform::Windows), "com10");
        assert_eq!(sanitize_for("console", Platform::Windows), "console");
        assert_eq!(sanitize_for("CON", Platform::Unix), "CON");
    }

    #[test]
    fn test_output_is_clean_and_idempotent() {
        let samples = [
            "Test Notebook",
            " leading and trailing ",
            "weird\u{1}\u{85}name",
            "a:b/c",
            ".",
            "..",
            "aux.txt",
            "trailing dots...",
            "",
        ];

        for platform in [Platform::Unix, Platform::Windows] {
            for sample in samples {
                let once = sanitize_for(sample, platform);
                assert!(!once.chars().any(|c| c.is_whitespace()), "{:?}", once);
                assert!(!once.chars().any(is_stripped_control), "{:?}", once);
                assert!(!once.chars().any(|c| PATH_HOSTILE.contains(&c)), "{:?}", once);
                assert_eq!(sanitize_for(&once, platform), once, "{:?}", sample);
            }
        }
    }

    #[test]
    fn test_path_segment_rejects_parent_and_empty() {
        assert_eq!(path_segment("Test Notebook").as_deref(), Some("Test-Notebook"));
        assert_eq!(path_segment(".").as_deref(), Some("dot"));
        assert_eq!(path_segment(".."), None);
        assert_eq!(path_segment("\u{1}"), None);
        assert_eq!(path_segment(""), None);
    }

    #[test]
    fn test_normalize_notebook_path() {
        assert_eq!(
            normalize_notebook_path(Path::new("/home/me/My Notes")),
            PathBuf::from("/home/me/My-Notes")
        );
        assert_eq!(normalize_notebook_path(Path::new("plain")), PathBuf::from("plain"));
    }
}
