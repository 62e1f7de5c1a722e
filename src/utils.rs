use anyhow::{Result, anyhow};
use directories::ProjectDirs;

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn strip_controls_and_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // ANSI escape sequence (ESC … letter)
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }

            // Drop all ASCII control characters
            c if c.is_control() => {}

            c => out.push(c),
        }
    }

    out.trim().to_string()
}

pub fn get_data_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "quizzer")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi_escapes() {
        let input = "\x1b[1msk-secret\x1b[0m";
        assert_eq!(strip_controls_and_escapes(input), "sk-secret");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(strip_controls_and_escapes("key\r\n\t"), "key");
    }

    #[test]
    fn trim_line_rejects_blank_input() {
        assert_eq!(trim_line("  key  "), Some("key"));
        assert_eq!(trim_line("   "), None);
    }

    #[test]
    fn pluralize_handles_counts() {
        assert_eq!(pluralize("question", 1), "1 question");
        assert_eq!(pluralize("question", 0), "0 questions");
        assert_eq!(pluralize("question", 3), "3 questions");
    }
}
