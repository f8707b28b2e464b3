use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Search,
    Comment,
}

/// Which buffer a keystroke changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferEdit {
    Search,
    Comment,
    Unchanged,
}

/// Search/comment mode switch together with the two text buffers it routes typing to.
#[derive(Debug, Default)]
pub struct InputModeController {
    mode: InputMode,
    search: String,
    comment: String,
}

impl InputModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn comment_text(&self) -> &str {
        &self.comment
    }

    /// SEARCH -> COMMENT, with the comment buffer preloaded from the selected item.
    pub fn begin_comment(&mut self, current: &str) {
        if self.mode == InputMode::Comment {
            return;
        }
        self.comment.clear();
        self.comment.push_str(current);
        self.mode = InputMode::Comment;
        debug!("input mode: comment");
    }

    /// COMMENT -> SEARCH without keeping the edit.
    pub fn cancel_comment(&mut self) {
        if self.mode == InputMode::Search {
            return;
        }
        self.comment.clear();
        self.mode = InputMode::Search;
        debug!("input mode: search (comment discarded)");
    }

    /// COMMENT -> SEARCH, handing back the edited comment. `None` outside comment mode.
    pub fn finish_comment(&mut self) -> Option<String> {
        if self.mode == InputMode::Search {
            return None;
        }
        self.mode = InputMode::Search;
        debug!("input mode: search (comment saved)");
        Some(std::mem::take(&mut self.comment))
    }

    pub fn insert_char(&mut self, ch: char) -> BufferEdit {
        self.active_buffer().push(ch);
        self.edited()
    }

    pub fn delete_char(&mut self) -> BufferEdit {
        match self.active_buffer().pop() {
            Some(_) => self.edited(),
            None => BufferEdit::Unchanged,
        }
    }

    fn active_buffer(&mut self) -> &mut String {
        match self.mode {
            InputMode::Search => &mut self.search,
            InputMode::Comment => &mut self.comment,
        }
    }

    fn edited(&self) -> BufferEdit {
        match self.mode {
            InputMode::Search => BufferEdit::Search,
            InputMode::Comment => BufferEdit::Comment,
        }
    }
}
