//! Utility functions for creating A2A Artifact objects.

use crate::types::{Artifact, Part};
use crate::utils::parts::get_text_parts;
use serde_json::Value;

/// Creates a new Artifact at index 0.
///
/// # Example
///
/// ```
/// use a2a_min::types::Part;
/// use a2a_min::utils::new_artifact;
///
/// let artifact = new_artifact(vec![Part::text("Sample text")], "My Artifact", Some("A test artifact."));
/// assert_eq!(artifact.name, Some("My Artifact".to_string()));
/// assert_eq!(artifact.index, 0);
/// ```
pub fn new_artifact(
    parts: Vec<Part>,
    name: impl Into<String>,
    description: Option<impl Into<String>>,
) -> Artifact {
    Artifact {
        name: Some(name.into()),
        description: description.map(|d| d.into()),
        parts,
        index: 0,
        append: None,
        last_chunk: None,
        metadata: None,
    }
}

/// Creates a new Artifact containing a single text Part.
pub fn new_text_artifact(
    name: impl Into<String>,
    text: impl Into<String>,
    description: Option<impl Into<String>>,
) -> Artifact {
    new_artifact(vec![Part::text(text)], name, description)
}

/// Creates a new Artifact containing a single data Part.
pub fn new_data_artifact(
    name: impl Into<String>,
    data: Value,
    description: Option<impl Into<String>>,
) -> Artifact {
    new_artifact(vec![Part::data(data)], name, description)
}

/// Creates an unnamed chunk targeting the artifact at `index`.
///
/// With `append = true` the chunk extends that artifact instead of
/// replacing it.
///
/// # Example
///
/// ```
/// use a2a_min::types::Part;
/// use a2a_min::utils::artifact_chunk;
///
/// let chunk = artifact_chunk(1, vec![Part::text("more")], true, false);
/// assert_eq!(chunk.append, Some(true));
/// assert_eq!(chunk.last_chunk, Some(false));
/// ```
pub fn artifact_chunk(index: u32, parts: Vec<Part>, append: bool, last_chunk: bool) -> Artifact {
    Artifact {
        name: None,
        description: None,
        parts,
        index,
        append: Some(append),
        last_chunk: Some(last_chunk),
        metadata: None,
    }
}

/// Extracts and joins all text content from an Artifact's parts.
pub fn get_artifact_text(artifact: &Artifact, delimiter: &str) -> String {
    get_text_parts(&artifact.parts).join(delimiter)
}
