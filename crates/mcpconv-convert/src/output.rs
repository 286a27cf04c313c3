//! Writing converted configs to disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use mcpconv_core::config::OutputAction;
use mcpconv_core::format::FormatError;
use mcpconv_core::OutputFormat;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot merge into {}: {source}", .path.display())]
    Merge {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// What [`write_output`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped,
    Merged,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOutcome::Written => "written",
            WriteOutcome::Skipped => "skipped (file exists)",
            WriteOutcome::Merged => "merged into existing file",
        })
    }
}

/// Write `text` to `path`, honouring `action` when the file already exists.
///
/// Parent directories are created as needed. A missing file is always
/// written regardless of the action.
pub fn write_output(
    path: &Path,
    text: &str,
    format: OutputFormat,
    action: OutputAction,
) -> Result<WriteOutcome, OutputError> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path.exists() {
        match action {
            OutputAction::Skip => {
                info!(path = %path.display(), "Output exists, skipping");
                return Ok(WriteOutcome::Skipped);
            }
            OutputAction::Merge => {
                let existing = std::fs::read_to_string(path).map_err(io_err)?;
                let merged = merge_documents(&existing, text, format).map_err(|source| {
                    OutputError::Merge {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                std::fs::write(path, with_trailing_newline(&merged)).map_err(io_err)?;
                info!(path = %path.display(), "Merged output into existing file");
                return Ok(WriteOutcome::Merged);
            }
            OutputAction::Overwrite => {
                debug!(path = %path.display(), "Overwriting existing file");
            }
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, with_trailing_newline(text)).map_err(io_err)?;
    info!(path = %path.display(), "Wrote output");
    Ok(WriteOutcome::Written)
}

/// Merge `incoming` into `existing`, both in `format`.
///
/// Top-level keys from `incoming` win, except that two objects under the same
/// key (e.g. the server map) are merged one level deep.
pub fn merge_documents(
    existing: &str,
    incoming: &str,
    format: OutputFormat,
) -> Result<String, FormatError> {
    let base = if existing.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        format.decode(existing)?
    };
    let update = format.decode(incoming)?;

    let merged = match (base, update) {
        (Value::Object(mut base), Value::Object(update)) => {
            for (key, value) in update {
                match (base.get_mut(&key), value) {
                    (Some(Value::Object(inner)), Value::Object(new_inner)) => {
                        inner.extend(new_inner);
                    }
                    (_, value) => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, update) => update,
    };
    format.encode(&merged)
}

fn with_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".gemini").join("settings.json");

        let outcome = write_output(&path, "{\"mcpServers\": {}}", OutputFormat::Json, OutputAction::Overwrite)
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"mcpServers\": {}}\n");
    }

    #[test]
    fn test_skip_leaves_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".mcp.json");
        std::fs::write(&path, "original").unwrap();

        let outcome = write_output(&path, "{}", OutputFormat::Json, OutputAction::Skip).unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_skip_writes_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new.json");
        let outcome = write_output(&path, "{\"a\": 1}", OutputFormat::Json, OutputAction::Skip).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
    }

    #[test]
    fn test_merge_json_server_maps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".mcp.json");
        std::fs::write(
            &path,
            r#"{"mcpServers": {"old": {"command": "a"}, "foo": {"command": "stale"}}, "theme": "dark"}"#,
        )
        .unwrap();

        let outcome = write_output(
            &path,
            r#"{"mcpServers": {"foo": {"command": "node"}}}"#,
            OutputFormat::Json,
            OutputAction::Merge,
        )
        .unwrap();
        assert_eq!(outcome, WriteOutcome::Merged);

        let merged = OutputFormat::Json
            .decode(&std::fs::read_to_string(&path).unwrap())
            .unwrap();
        assert_eq!(merged["mcpServers"]["old"]["command"], "a");
        assert_eq!(merged["mcpServers"]["foo"]["command"], "node");
        assert_eq!(merged["theme"], "dark");
    }

    #[test]
    fn test_merge_toml() {
        let existing = "model = \"o3\"\n\n[mcp_servers.old]\ncommand = \"a\"\n";
        let incoming = "[mcp_servers.foo]\ncommand = \"node\"\n";

        let merged = merge_documents(existing, incoming, OutputFormat::Toml).unwrap();
        let value = OutputFormat::Toml.decode(&merged).unwrap();

        assert_eq!(value["model"], "o3");
        assert_eq!(value["mcp_servers"]["old"]["command"], "a");
        assert_eq!(value["mcp_servers"]["foo"]["command"], "node");
    }

    #[test]
    fn test_merge_invalid_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".mcp.json");
        std::fs::write(&path, "not json {").unwrap();

        let err = write_output(&path, "{}", OutputFormat::Json, OutputAction::Merge).unwrap_err();
        assert!(matches!(err, OutputError::Merge { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json {");
    }
}
