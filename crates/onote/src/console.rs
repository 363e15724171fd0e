//! Line-oriented mode started with `onote -c`.
//!
//! Lines typed at the `: ` prompt are fed through the coordinator until a
//! line reading `END`. The collected text is saved to a file named by the
//! user, read back and echoed.

use anyhow::Result;
use onote_core::{EditCoordinator, EditorEvent};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::file_manager::FileManager;

/// Runs one console session. Returns the file written, if any.
pub async fn run<R, W>(
    input: R,
    output: &mut W,
    coordinator: &mut EditCoordinator,
) -> Result<Option<PathBuf>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b": ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.eq_ignore_ascii_case("end") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        for ch in line.chars().chain(std::iter::once('\n')) {
            coordinator.apply_event(EditorEvent::Insert(ch));
        }
    }

    if coordinator.is_empty() {
        log::info!("Console session ended without text");
        return Ok(None);
    }

    output.write_all(b"Save to a file: ").await?;
    output.flush().await?;
    let filename = lines.next_line().await?.unwrap_or_default();
    let filename = filename.trim();
    if filename.is_empty() {
        output.write_all(b"Filename cannot be empty\n").await?;
        return Ok(None);
    }

    let path = PathBuf::from(filename);
    let mut file_manager = FileManager::new();
    if let Err(e) = file_manager.save_file_as(path.clone(), coordinator).await {
        log::error!("Console save failed: {}", e);
        output.write_all(format!("{}\n", e).as_bytes()).await?;
        return Ok(None);
    }

    output.write_all(b"\n").await?;
    match file_manager.open_file(path.clone()).await {
        Ok(text) => {
            let report = format!("Text read back from {} is:\n{}\n", path.display(), text);
            output.write_all(report.as_bytes()).await?;
        }
        Err(e) => {
            output.write_all(format!("{}\n", e).as_bytes()).await?;
        }
    }
    output.flush().await?;

    Ok(Some(path))
}
