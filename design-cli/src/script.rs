//! Edit scripts.
//!
//! A script is a JSON array of editor commands, in the same
//! `{"command": ..., "data": ...}` shape [`EditorCommand`] serializes to,
//! plus one file-system step:
//!
//! ```json
//! [
//!   {"command": "add_logo_file", "data": {"path": "logo.png"}},
//!   {"command": "resize", "data": {"delta": 10}},
//!   {"command": "add_text", "data": {"content": "Team", "color": "#ff0000"}}
//! ]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use design_core::{EditorCommand, EditorState, LogoUpload};
use serde::Deserialize;
use serde_json::Value;

/// One script step.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Upload a logo from disk.
    AddLogoFile {
        /// Image path, relative to the script.
        path: PathBuf,
        /// MIME type; guessed from the extension when absent.
        mime: Option<String>,
    },
    /// Any editor command.
    Editor(EditorCommand),
}

#[derive(Deserialize)]
struct LogoFileData {
    path: PathBuf,
    #[serde(default)]
    mime: Option<String>,
}

/// Parse a script.
///
/// # Errors
///
/// Returns an error naming the first step that is not valid.
pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>> {
    let raw: Vec<Value> = serde_json::from_str(json).context("script must be a JSON array")?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse_step(value).with_context(|| format!("invalid script step {}", index + 1))
        })
        .collect()
}

fn parse_step(value: Value) -> Result<ScriptStep> {
    if value.get("command").and_then(Value::as_str) == Some("add_logo_file") {
        let data = value.get("data").cloned().unwrap_or(Value::Null);
        let LogoFileData { path, mime } = serde_json::from_value(data)?;
        return Ok(ScriptStep::AddLogoFile { path, mime });
    }
    Ok(ScriptStep::Editor(serde_json::from_value(value)?))
}

/// Guess an image MIME type from a file extension.
#[must_use]
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Replay `steps` against `state`; relative paths resolve against `base_dir`.
///
/// # Errors
///
/// Stops at the first step that fails, leaving earlier steps applied.
pub fn apply_script(state: &mut EditorState, steps: &[ScriptStep], base_dir: &Path) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        apply_step(state, step, base_dir).with_context(|| format!("script step {}", index + 1))?;
    }
    tracing::debug!(
        "Applied {} script steps, {} elements",
        steps.len(),
        state.store().len()
    );
    Ok(())
}

fn apply_step(state: &mut EditorState, step: &ScriptStep, base_dir: &Path) -> Result<()> {
    match step {
        ScriptStep::AddLogoFile { path, mime } => {
            let full = base_dir.join(path);
            let bytes =
                std::fs::read(&full).with_context(|| format!("reading {}", full.display()))?;
            let mime = mime
                .clone()
                .or_else(|| guess_mime(&full).map(str::to_string))
                .unwrap_or_default();
            let file_name = full
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            state.add_logo(&LogoUpload::new(file_name, mime, bytes))?;
        }
        ScriptStep::Editor(command) => state.apply(command)?,
    }
    Ok(())
}
