use chrono::{ DateTime, Local };
use log::info;
use std::fs;
use std::path::{ Path, PathBuf };
use crate::models::chat::Message;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No chat history to export")]
    Empty,
    #[error("Failed to write export file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn render(messages: &[Message]) -> Result<String, ExportError> {
    if messages.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role.title(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    )
}

pub fn file_name(at: DateTime<Local>) -> String {
    format!("chat_history_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

pub fn write_to_dir(
    messages: &[Message],
    dir: &Path,
    at: DateTime<Local>
) -> Result<PathBuf, ExportError> {
    let text = render(messages)?;
    let path = dir.join(file_name(at));
    fs::write(&path, text).map_err(|source| ExportError::Io { path: path.clone(), source })?;
    info!("Exported {} messages to {}", messages.len(), path.display());
    Ok(path)
}
