use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::info;

use crate::input::{BufferEdit, InputMode, InputModeController};
use crate::list::ListModel;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(String),
    Cancelled,
}

/// One interactive pick: the list, the input mode and how the run ended.
pub struct SelectorSession {
    list: ListModel,
    input: InputModeController,
    outcome: Option<Outcome>,
}

impl SelectorSession {
    pub fn new(list: ListModel) -> Self {
        Self {
            list,
            input: InputModeController::new(),
            outcome: None,
        }
    }

    pub fn list(&self) -> &ListModel {
        &self.list
    }

    pub fn input(&self) -> &InputModeController {
        &self.input
    }

    pub fn mode(&self) -> InputMode {
        self.input.mode()
    }

    pub fn set_page_size(&mut self, rows: usize) {
        self.list.set_page_size(rows);
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The confirmed name, or `None` when the run was cancelled or never finished.
    pub fn into_selection(self) -> Option<String> {
        match self.outcome {
            Some(Outcome::Confirmed(name)) => Some(name),
            Some(Outcome::Cancelled) | None => None,
        }
    }

    /// Applies one key press. Errors only come from writing the annotation store.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press || self.is_finished() {
            return Ok(());
        }
        if is_quit(&key) {
            info!("selection cancelled");
            self.outcome = Some(Outcome::Cancelled);
            return Ok(());
        }
        match self.input.mode() {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Comment => self.handle_comment_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.page_up(),
            KeyCode::PageDown => self.list.page_down(),
            KeyCode::Char('k') if control => self.list.move_selection(-1),
            KeyCode::Char('j') if control => self.list.move_selection(1),
            KeyCode::Char('u') if control => self.list.page_up(),
            KeyCode::Char('d') if control => self.list.page_down(),
            KeyCode::Enter => self.confirm(),
            KeyCode::Char('p') if control => {
                if let Some(pinned) = self
                    .list
                    .toggle_pin_selected()
                    .context("failed to save pin")?
                {
                    info!(pinned, "pin toggled");
                }
            }
            KeyCode::Char('t') if control => {
                if let Some(tag) = self
                    .list
                    .cycle_mode_tag_selected()
                    .context("failed to save theme mode")?
                {
                    info!(?tag, "theme mode cycled");
                }
            }
            KeyCode::Char('l') if control => {
                if let Some(item) = self.list.selected() {
                    self.input.begin_comment(item.comment());
                }
            }
            KeyCode::Backspace => {
                if self.input.delete_char() == BufferEdit::Search {
                    self.list.set_search(self.input.search_text());
                }
            }
            KeyCode::Char(ch) if is_plain(&key) => {
                if self.input.insert_char(ch) == BufferEdit::Search {
                    self.list.set_search(self.input.search_text());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_comment_key(&mut self, key: KeyEvent) -> Result<()> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if control => self.input.cancel_comment(),
            KeyCode::Enter => {
                if self.list.selected().is_none() {
                    return Ok(());
                }
                if let Some(comment) = self.input.finish_comment() {
                    self.list
                        .set_comment_selected(&comment)
                        .context("failed to save comment")?;
                    info!(comment = %comment, "comment saved");
                }
            }
            KeyCode::Backspace => {
                self.input.delete_char();
            }
            KeyCode::Char(ch) if is_plain(&key) => {
                self.input.insert_char(ch);
            }
            _ => {}
        }
        Ok(())
    }

    fn confirm(&mut self) {
        if let Some(item) = self.list.selected() {
            info!(name = item.name(), "selection confirmed");
            self.outcome = Some(Outcome::Confirmed(item.name().to_string()));
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
}

fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}
