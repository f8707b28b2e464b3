use crate::store::{AnnotationRecord, ModeTag};

const PIN_GLYPH: char = '*';
const COMMENT_SEPARATOR: &str = "   # ";

/// A candidate name paired with its live annotation and the cached line shown for it.
///
/// The item owns its record; it is not shared with the store. `ListModel` copies the
/// record back into the store after each mutation, so the item is the live state that
/// sorting and filtering read.
#[derive(Clone, Debug)]
pub struct AnnotatedItem {
    name: String,
    record: AnnotationRecord,
    rendered: String,
}

impl AnnotatedItem {
    pub fn new(name: impl Into<String>, record: AnnotationRecord) -> Self {
        let name = name.into();
        let rendered = render_line(&name, &record);
        Self {
            name,
            record,
            rendered,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record(&self) -> &AnnotationRecord {
        &self.record
    }

    pub fn is_pinned(&self) -> bool {
        self.record.pinned
    }

    pub fn comment(&self) -> &str {
        &self.record.comment
    }

    /// Tag glyph, optional pin glyph, name and comment suffix, ending in `'\n'`.
    pub fn render(&self) -> &str {
        &self.rendered
    }

    /// Case-sensitive substring test against the rendered line, so decorations and
    /// comments are searchable too.
    pub fn contains(&self, needle: &str) -> bool {
        self.rendered.contains(needle)
    }

    pub fn toggle_pin(&mut self) -> bool {
        self.record.pinned = !self.record.pinned;
        self.refresh();
        self.record.pinned
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.record.comment = text.into();
        self.refresh();
    }

    pub fn cycle_mode_tag(&mut self) -> ModeTag {
        self.record.mode_tag = self.record.mode_tag.next();
        self.refresh();
        self.record.mode_tag
    }

    fn refresh(&mut self) {
        self.rendered = render_line(&self.name, &self.record);
    }
}

fn render_line(name: &str, record: &AnnotationRecord) -> String {
    let mut line = String::with_capacity(name.len() + record.comment.len() + 10);
    line.push(record.mode_tag.glyph());
    line.push(' ');
    if record.pinned {
        line.push(PIN_GLYPH);
        line.push(' ');
    }
    push_single_line(&mut line, name);
    if !record.comment.is_empty() {
        line.push_str(COMMENT_SEPARATOR);
        push_single_line(&mut line, &record.comment);
    }
    line.push('\n');
    line
}

/// Control characters (newlines included) become spaces so the line keeps one terminator.
fn push_single_line(line: &mut String, text: &str) {
    line.extend(text.chars().map(|ch| if ch.is_control() { ' ' } else { ch }));
}
