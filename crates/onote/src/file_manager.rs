use anyhow::Result;
use onote_core::EditCoordinator;
use std::path::{Path, PathBuf};
use tokio::fs;

const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;
const LARGE_CONTENT_THRESHOLD: usize = 50 * 1024 * 1024;
const MAX_ATTEMPTS: u32 = 3;

pub struct FileManager {
    pub current_path: Option<PathBuf>,
    pub is_readonly: bool,
}

impl FileManager {
    pub fn new() -> Self {
        Self {
            current_path: None,
            is_readonly: false,
        }
    }

    pub fn get_current_path(&self) -> Option<&PathBuf> {
        self.current_path.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.current_path.is_some()
    }

    /// Name shown in the title bar.
    pub fn display_name(&self) -> String {
        self.current_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Forgets the current file, as for a new document.
    pub fn reset(&mut self) {
        self.current_path = None;
        self.is_readonly = false;
    }

    pub async fn open_file(&mut self, path: PathBuf) -> Result<String> {
        if !path.exists() {
            return Err(anyhow::anyhow!("File not found: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow::anyhow!("Not a file: {}", path.display()));
        }

        match fs::metadata(&path).await {
            Ok(metadata) => {
                self.is_readonly = metadata.permissions().readonly();
                if metadata.len() > LARGE_FILE_THRESHOLD {
                    log::warn!(
                        "Large file detected ({} bytes): {}",
                        metadata.len(),
                        path.display()
                    );
                }
            }
            Err(e) => {
                log::warn!("Failed to get file metadata: {}", e);
                self.is_readonly = false;
            }
        }

        match fs::read_to_string(&path).await {
            Ok(content) => {
                if content.contains('\0') {
                    return Err(anyhow::anyhow!(
                        "File looks like binary data: {}",
                        path.display()
                    ));
                }

                self.current_path = Some(path.clone());
                log::info!("Successfully opened file: {}", path.display());
                Ok(content)
            }
            Err(e) => {
                let error_msg = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        format!("Permission denied: {}", path.display())
                    }
                    std::io::ErrorKind::NotFound => {
                        format!("File not found: {}", path.display())
                    }
                    std::io::ErrorKind::InvalidData => {
                        format!("File is not valid UTF-8: {}", path.display())
                    }
                    _ => format!("Could not read {}: {}", path.display(), e),
                };
                Err(anyhow::anyhow!(error_msg))
            }
        }
    }

    /// Opens `path` and loads it into the coordinator, which resets its
    /// undo history.
    pub async fn open_into(
        &mut self,
        path: PathBuf,
        coordinator: &mut EditCoordinator,
    ) -> Result<String> {
        let content = self.open_file(path).await?;
        coordinator.load(&content);
        Ok(format!(
            "Opened {} ({} lines)",
            self.display_name(),
            line_count(&content)
        ))
    }

    pub async fn save_file(&self, coordinator: &mut EditCoordinator) -> Result<String> {
        let Some(path) = self.current_path.as_ref() else {
            return Err(anyhow::anyhow!("No file name set"));
        };

        if self.is_readonly {
            return Err(anyhow::anyhow!("File is read-only: {}", path.display()));
        }

        let content = coordinator.current_text();
        check_size(&content)?;

        let mut attempts = 0;
        loop {
            match fs::write(path, content.as_bytes()).await {
                Ok(_) => {
                    coordinator.mark_saved();
                    log::info!("Successfully saved file: {}", path.display());
                    return Ok(format!("Wrote {} lines", line_count(&content)));
                }
                Err(e) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(anyhow::anyhow!(write_error_message(path, &e)));
                    }

                    tokio::time::sleep(tokio::time::Duration::from_millis(100 * attempts as u64))
                        .await;
                    log::warn!(
                        "Save attempt {} failed for {}, retrying...",
                        attempts,
                        path.display()
                    );
                }
            }
        }
    }

    pub async fn save_file_as(
        &mut self,
        path: PathBuf,
        coordinator: &mut EditCoordinator,
    ) -> Result<String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!("Could not create directory {}: {}", parent.display(), e)
                })?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        if path.exists() {
            match fs::metadata(&path).await {
                Ok(metadata) if metadata.permissions().readonly() => {
                    return Err(anyhow::anyhow!(
                        "Target file is read-only: {}",
                        path.display()
                    ));
                }
                Ok(_) => {}
                Err(e) => log::warn!("Failed to check target file metadata: {}", e),
            }
        }

        let content = coordinator.current_text();
        check_size(&content)?;

        match fs::write(&path, content.as_bytes()).await {
            Ok(_) => {
                self.current_path = Some(path.clone());
                self.is_readonly = false;
                coordinator.mark_saved();
                log::info!("Successfully saved file as: {}", path.display());
                Ok(format!(
                    "Wrote {} lines to '{}'",
                    line_count(&content),
                    path.display()
                ))
            }
            Err(e) => Err(anyhow::anyhow!(write_error_message(&path, &e))),
        }
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}

fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

fn check_size(content: &str) -> Result<()> {
    if content.len() > LARGE_CONTENT_THRESHOLD {
        return Err(anyhow::anyhow!(
            "Content too large to save ({} bytes)",
            content.len()
        ));
    }
    Ok(())
}

fn write_error_message(path: &Path, e: &std::io::Error) -> String {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            format!("No write permission: {}", path.display())
        }
        std::io::ErrorKind::WriteZero => {
            format!("Disk may be full: {}", path.display())
        }
        _ => format!("Could not write {}: {}", path.display(), e),
    }
}
