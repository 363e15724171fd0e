use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use onote_core::position::{self, CursorPosition};
use onote_core::{Direction, EditCoordinator, EditOutcome, EditorEvent, HighlightSpan};
use std::path::PathBuf;

use crate::config::Config;
use crate::file_manager::FileManager;
use crate::status::{MessageType, StatusLine, StatusMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    SaveAs,
    Search,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Open => "Open file: ",
            PromptKind::SaveAs => "Save as: ",
            PromptKind::Search => "Search: ",
        }
    }
}

/// What to do once the user has answered the save prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Quit,
    NewFile,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edit,
    Prompt(PromptKind),
    SavePrompt(PendingAction),
}

pub struct App {
    pub coordinator: EditCoordinator,
    pub config: Config,
    pub file_manager: FileManager,
    pub status: StatusLine,
    mode: Mode,
    prompt: String,
    after_save: Option<PendingAction>,
    search_term: Option<String>,
    search_spans: Vec<HighlightSpan>,
    /// First document line shown on screen.
    pub scroll: usize,
    should_quit: bool,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let coordinator = EditCoordinator::new(config.coordinator_options());
        Self {
            coordinator,
            config,
            file_manager: FileManager::new(),
            status: StatusLine::new(),
            mode: Mode::Edit,
            prompt: String::new(),
            after_save: None,
            search_term: None,
            search_spans: Vec::new(),
            scroll: 0,
            should_quit: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn prompt_input(&self) -> &str {
        &self.prompt
    }

    pub fn search_spans(&self) -> &[HighlightSpan] {
        &self.search_spans
    }

    pub fn is_modified(&self) -> bool {
        self.coordinator.is_modified()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn title(&self) -> String {
        let modified = if self.is_modified() { " [Modified]" } else { "" };
        format!("{} - Onote{}", self.file_manager.display_name(), modified)
    }

    pub fn update_status(&mut self) {
        self.status.tick();
    }

    /// Keeps the cursor line inside a viewport `height` lines tall.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        let line = self.coordinator.cursor_position().line - 1;
        if line < self.scroll {
            self.scroll = line;
        } else if height > 0 && line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    pub async fn open_path(&mut self, path: PathBuf) {
        match self.file_manager.open_into(path, &mut self.coordinator).await {
            Ok(message) => {
                self.clear_search();
                self.scroll = 0;
                self.status.success(message);
            }
            Err(e) => {
                log::error!("Failed to open file: {}", e);
                self.status.error(e.to_string());
            }
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Edit => self.handle_edit_key(key).await,
            Mode::Prompt(kind) => self.handle_prompt_key(kind, key).await,
            Mode::SavePrompt(pending) => self.handle_save_prompt_key(pending, key).await,
        }
    }

    async fn handle_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('z') if ctrl => {
                self.send(EditorEvent::Undo);
            }
            KeyCode::Char('y') if ctrl => {
                self.send(EditorEvent::Redo);
            }
            KeyCode::Char('s') | KeyCode::Char('S') if ctrl && shift => {
                self.start_prompt(PromptKind::SaveAs)
            }
            KeyCode::Char('a') if ctrl => self.start_prompt(PromptKind::SaveAs),
            KeyCode::Char('s') if ctrl => {
                self.save().await;
            }
            KeyCode::Char('o') if ctrl => self.guard_unsaved(PendingAction::Open),
            KeyCode::Char('n') if ctrl => self.guard_unsaved(PendingAction::NewFile),
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.guard_unsaved(PendingAction::Quit)
            }
            KeyCode::Char('f') if ctrl => self.start_prompt(PromptKind::Search),
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {}
            KeyCode::Char(c) => {
                self.send(EditorEvent::Insert(c));
            }
            KeyCode::Enter | KeyCode::Tab if self.has_suggestions() => {
                self.send(EditorEvent::AcceptSuggestion);
            }
            KeyCode::Enter => {
                self.send(EditorEvent::Insert('\n'));
            }
            KeyCode::Tab => {
                for _ in 0..self.config.editor.tab_size {
                    self.send(EditorEvent::Insert(' '));
                }
            }
            KeyCode::Backspace => {
                self.send(EditorEvent::Backspace);
            }
            KeyCode::Up => {
                self.send(EditorEvent::Navigate(Direction::Up));
            }
            KeyCode::Down => {
                self.send(EditorEvent::Navigate(Direction::Down));
            }
            KeyCode::Left => {
                let target = self.coordinator.cursor().saturating_sub(1);
                self.move_to_index(target);
            }
            KeyCode::Right => {
                let target = (self.coordinator.cursor() + 1).min(self.coordinator.len());
                self.move_to_index(target);
            }
            KeyCode::Home => {
                let here = self.coordinator.cursor_position();
                self.report_cursor(CursorPosition::new(here.line, 0));
            }
            KeyCode::End => {
                // The column clamps to the end of the line.
                let here = self.coordinator.cursor_position();
                self.report_cursor(CursorPosition::new(here.line, usize::MAX));
            }
            KeyCode::Esc => {
                self.clear_search();
                self.status.clear();
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_prompt_key(&mut self, kind: PromptKind, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.prompt);
                self.mode = Mode::Edit;
                self.status.clear();
                self.commit_prompt(kind, input.trim()).await;
            }
            KeyCode::Esc => {
                self.prompt.clear();
                self.after_save = None;
                self.mode = Mode::Edit;
                self.status.clear();
            }
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.prompt.push(c);
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_save_prompt_key(&mut self, pending: PendingAction, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Edit;
                if self.file_manager.has_file() {
                    if self.save().await {
                        self.run_pending(pending);
                    }
                } else {
                    self.after_save = Some(pending);
                    self.start_prompt(PromptKind::SaveAs);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.mode = Mode::Edit;
                self.run_pending(pending);
            }
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
                self.mode = Mode::Edit;
                self.status.clear();
            }
            _ => {}
        }
        Ok(())
    }

    async fn commit_prompt(&mut self, kind: PromptKind, input: &str) {
        match kind {
            PromptKind::Search => self.search(input),
            PromptKind::Open => {
                if input.is_empty() {
                    self.status.info("Open cancelled");
                    return;
                }
                self.open_path(PathBuf::from(input)).await;
            }
            PromptKind::SaveAs => {
                if input.is_empty() {
                    self.after_save = None;
                    self.status.info("Save cancelled");
                    return;
                }
                let result = self
                    .file_manager
                    .save_file_as(PathBuf::from(input), &mut self.coordinator)
                    .await;
                match result {
                    Ok(message) => {
                        self.status.success(message);
                        if let Some(pending) = self.after_save.take() {
                            self.run_pending(pending);
                        }
                    }
                    Err(e) => {
                        self.after_save = None;
                        log::error!("Save as failed: {}", e);
                        self.status.error(e.to_string());
                    }
                }
            }
        }
    }

    /// Saves to the current file, or asks for a name when there is none.
    /// Returns whether the document reached the disk.
    async fn save(&mut self) -> bool {
        if !self.file_manager.has_file() {
            self.start_prompt(PromptKind::SaveAs);
            return false;
        }

        match self.file_manager.save_file(&mut self.coordinator).await {
            Ok(message) => {
                self.status.success(message);
                true
            }
            Err(e) => {
                log::error!("Save failed: {}", e);
                self.status.error(e.to_string());
                false
            }
        }
    }

    fn guard_unsaved(&mut self, pending: PendingAction) {
        if self.is_modified() {
            self.mode = Mode::SavePrompt(pending);
            self.status.set(StatusMessage::sticky(
                format!(
                    "Save changes to {}? (y/n/c)",
                    self.file_manager.display_name()
                ),
                MessageType::Warning,
            ));
        } else {
            self.run_pending(pending);
        }
    }

    fn run_pending(&mut self, pending: PendingAction) {
        match pending {
            PendingAction::Quit => {
                log::info!("Quit requested");
                self.should_quit = true;
            }
            PendingAction::NewFile => {
                self.coordinator.load("");
                self.file_manager.reset();
                self.clear_search();
                self.scroll = 0;
                self.status.info("New file");
            }
            PendingAction::Open => self.start_prompt(PromptKind::Open),
        }
    }

    fn start_prompt(&mut self, kind: PromptKind) {
        self.prompt.clear();
        self.mode = Mode::Prompt(kind);
    }

    fn search(&mut self, term: &str) {
        if term.is_empty() {
            self.status.warning("Please enter a word to search.");
            return;
        }

        self.search_spans = self.coordinator.search(term);
        self.search_term = Some(term.to_string());

        let text = self.coordinator.current_text();
        match onote_core::search::find_next(&text, term, self.coordinator.cursor()) {
            Some(first) => {
                self.report_cursor(position::line_column(&text, first.start));
                self.status
                    .info(format!("{} match(es) for '{}'", self.search_spans.len(), term));
            }
            None => self.status.info(format!("No matches for '{}'", term)),
        }
    }

    fn clear_search(&mut self) {
        self.search_term = None;
        self.search_spans.clear();
    }

    fn has_suggestions(&self) -> bool {
        !self.coordinator.query_suggestions().is_empty()
    }

    fn move_to_index(&mut self, index: usize) {
        let text = self.coordinator.current_text();
        self.report_cursor(position::line_column(&text, index));
    }

    fn report_cursor(&mut self, target: CursorPosition) {
        self.send(EditorEvent::CursorReport {
            line: target.line,
            column: target.column,
        });
    }

    /// Hands one event to the engine and surfaces its notice.
    fn send(&mut self, event: EditorEvent) -> EditOutcome {
        let outcome = self.coordinator.apply_event(event);
        if let Some(notice) = &outcome.notice {
            self.status.notice(notice);
        }
        if let Some(term) = &self.search_term {
            self.search_spans = onote_core::search::find_all(&outcome.text, term);
        }
        outcome
    }
}
