//! Utility functions for working with A2A Part objects.

use crate::types::{FileContent, Part};
use serde_json::Value;

/// Extracts text content from all text Parts in a list.
///
/// # Example
///
/// ```
/// use a2a_min::types::Part;
/// use a2a_min::utils::get_text_parts;
///
/// let parts = vec![Part::text("Hello"), Part::data(serde_json::json!(1)), Part::text("World")];
/// assert_eq!(get_text_parts(&parts), vec!["Hello", "World"]);
/// ```
pub fn get_text_parts(parts: &[Part]) -> Vec<String> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Extracts data content from all data Parts in a list.
///
/// # Example
///
/// ```
/// use a2a_min::types::Part;
/// use a2a_min::utils::get_data_parts;
/// use serde_json::json;
///
/// let parts = vec![Part::data(json!({"key": "value"}))];
/// assert_eq!(get_data_parts(&parts), vec![json!({"key": "value"})]);
/// ```
pub fn get_data_parts(parts: &[Part]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Data { data, .. } => Some(data.clone()),
            _ => None,
        })
        .collect()
}

/// Extracts file content from all file Parts in a list.
pub fn get_file_parts(parts: &[Part]) -> Vec<FileContent> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::File { file, .. } => Some(file.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_text_parts_skips_other_kinds() {
        let parts = vec![
            Part::text("a"),
            Part::file_from_uri("https://example.com/f.txt", None),
            Part::text("b"),
        ];
        assert_eq!(get_text_parts(&parts), vec!["a", "b"]);
    }

    #[test]
    fn test_get_file_parts() {
        let parts = vec![
            Part::text("a"),
            Part::file_from_uri("https://example.com/f.txt", Some("text/plain".to_string())),
        ];
        let files = get_file_parts(&parts);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].mime_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_empty_parts() {
        assert!(get_text_parts(&[]).is_empty());
        assert!(get_data_parts(&[Part::text("x")]).is_empty());
        assert_eq!(get_data_parts(&[Part::data(json!([1, 2]))]), vec![json!([1, 2])]);
    }
}
