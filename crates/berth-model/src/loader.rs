//! Reads serialized stack snapshots.
//!
//! The snapshot is the model itself in YAML (or JSON) form. Compose
//! manifests are turned into this form by the manifest tooling upstream.

use std::path::Path;

use berth_common::error::{BerthError, Result};

use crate::stack::Stack;

/// Loads a stack snapshot from disk.
///
/// The raw file bytes are kept as the stack manifest. When the snapshot has
/// no name, the file stem is used.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_stack(path: &Path) -> Result<Stack> {
    tracing::info!(path = %path.display(), "loading stack");
    let bytes = std::fs::read(path).map_err(|e| BerthError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut stack = parse_stack(&bytes)?;
    if stack.name.is_empty() {
        stack.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(stack)
}

/// Parses a stack snapshot from raw bytes, keeping them as the manifest.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid snapshot.
pub fn parse_stack(bytes: &[u8]) -> Result<Stack> {
    let mut stack: Stack = serde_yaml::from_slice(bytes)?;
    stack.manifest = bytes.to_vec();
    Ok(stack)
}
