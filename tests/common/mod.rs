/*!
 * Common test utilities for the bunkai test suite
 */

use std::path::PathBuf;
use std::fs;
use anyhow::Result;
use tempfile::TempDir;


/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample foreign subtitle file for testing
pub fn create_foreign_subtitle(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:03,000
Hola.

2
00:00:03,000 --> 00:00:05,500
¿Cómo estás?

3
00:00:06,000 --> 00:00:08,000
Muy bien, gracias.
"#;
    create_test_file(dir, filename, content)
}

/// Creates a native subtitle file whose cue boundaries differ from the foreign one
pub fn create_native_subtitle(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:00,900 --> 00:00:02,000
Hello.

2
00:00:02,000 --> 00:00:05,400
How are you?

3
00:00:05,900 --> 00:00:08,100
Very well, thanks.
"#;
    create_test_file(dir, filename, content)
}

/// Split one line of delimited text the way an RFC 4180 reader does
pub fn parse_delimited_line(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() {
            quoted = true;
        } else if c == separator {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}
