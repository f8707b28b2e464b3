use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::input::InputMode;
use crate::session::SelectorSession;

const ACCENT_BG: Color = Color::LightGreen;
const ACCENT_FG: Color = Color::Black;
const LABEL_BG: Color = Color::White;

#[derive(Clone, Copy)]
struct HelpShortcut {
    title: &'static str,
    keys: &'static str,
}

const SEARCH_HELP: &[HelpShortcut] = &[
    HelpShortcut {
        title: "Search:",
        keys: " Type text to search ",
    },
    HelpShortcut {
        title: "Navigate:",
        keys: " ↑ ↓ PgUp PgDn ^j/^k ^d/^u ",
    },
    HelpShortcut {
        title: "Pin:",
        keys: " ^p ",
    },
    HelpShortcut {
        title: "Comment:",
        keys: " ^l ",
    },
    HelpShortcut {
        title: "Mode:",
        keys: " ^t ",
    },
    HelpShortcut {
        title: "Pick:",
        keys: " ↵ ",
    },
    HelpShortcut {
        title: "Quit:",
        keys: " ^q/^c ",
    },
];

const COMMENT_HELP: &[HelpShortcut] = &[
    HelpShortcut {
        title: "Comment:",
        keys: " Write a comment to save ",
    },
    HelpShortcut {
        title: "Save:",
        keys: " ↵ ",
    },
    HelpShortcut {
        title: "Back:",
        keys: " ^l ",
    },
    HelpShortcut {
        title: "Quit:",
        keys: " ^q/^c ",
    },
];

struct Areas {
    prompt: Rect,
    list: Rect,
    help: Rect,
}

fn split(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    Areas {
        prompt: chunks[0],
        list: chunks[2],
        help: chunks[3],
    }
}

/// Rows available to the list for a terminal of the given size, used as the page size.
pub fn list_rows(area: Rect) -> usize {
    split(area).list.height as usize
}

pub fn render(frame: &mut Frame, session: &SelectorSession) {
    let areas = split(frame.size());
    render_prompt(frame, areas.prompt, session);
    render_list(frame, areas.list, session);
    frame.render_widget(Paragraph::new(help_line(session.mode())), areas.help);
}

fn render_prompt(frame: &mut Frame, area: Rect, session: &SelectorSession) {
    let (label, text) = match session.mode() {
        InputMode::Search => ("Search:", session.input().search_text()),
        InputMode::Comment => ("Comment:", session.input().comment_text()),
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(ACCENT_FG).bg(ACCENT_BG)),
        Span::raw(" "),
        Span::raw(text.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let offset = label.width() + 1 + text.width();
    let max_x = area.width.saturating_sub(1) as usize;
    frame.set_cursor(area.x + offset.min(max_x) as u16, area.y);
}

fn render_list(frame: &mut Frame, area: Rect, session: &SelectorSession) {
    let view = session.list().view();
    let items: Vec<ListItem> = view
        .iter()
        .map(|item| ListItem::new(item.render().trim_end_matches('\n').to_string()))
        .collect();

    let list_style = match session.mode() {
        InputMode::Search => Style::default(),
        InputMode::Comment => Style::default().add_modifier(Modifier::DIM),
    };
    let list = List::new(items).style(list_style).highlight_style(
        Style::default()
            .fg(ACCENT_FG)
            .bg(ACCENT_BG)
            .remove_modifier(Modifier::DIM),
    );

    let mut state = ListState::default();
    if !view.is_empty() {
        state.select(Some(session.list().selected_index()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn help_line(mode: InputMode) -> Line<'static> {
    let shortcuts = match mode {
        InputMode::Search => SEARCH_HELP,
        InputMode::Comment => COMMENT_HELP,
    };
    let title_style = Style::default().fg(ACCENT_FG).bg(ACCENT_BG);
    let keys_style = Style::default().fg(ACCENT_FG).bg(LABEL_BG);
    let spans: Vec<Span<'static>> = shortcuts
        .iter()
        .flat_map(|shortcut| {
            [
                Span::styled(shortcut.title, title_style),
                Span::styled(shortcut.keys, keys_style),
            ]
        })
        .collect();
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListModel;
    use crate::store::{AnnotationStore, ModeTag};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> SelectorSession {
        let mut store = AnnotationStore::default();
        let mocha = store.get_or_create("mocha");
        mocha.pinned = true;
        mocha.mode_tag = ModeTag::Dark;
        store.get_or_create("latte").comment = "warm".into();
        SelectorSession::new(ListModel::new(
            ["frappe", "latte", "mocha"],
            store,
            dir.path().join("s.toml"),
        ))
    }

    fn draw(session: &SelectorSession) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal.draw(|frame| render(frame, session)).unwrap();
        terminal
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer.get(x, y).symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn draws_prompt_list_and_help() {
        let dir = TempDir::new().unwrap();
        let terminal = draw(&session(&dir));

        assert_eq!(row(&terminal, 0), "Search:");
        assert_eq!(row(&terminal, 1), "");
        assert_eq!(row(&terminal, 2), "D * mocha");
        assert_eq!(row(&terminal, 3), "  frappe");
        assert_eq!(row(&terminal, 4), "  latte   # warm");
        assert!(row(&terminal, 7).starts_with("Search: Type text to search"));
    }

    #[test]
    fn selected_row_is_highlighted() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session
            .handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
            .unwrap();
        let terminal = draw(&session);
        let buffer = terminal.backend().buffer();

        assert_eq!(buffer.get(2, 3).style().bg, Some(ACCENT_BG));
        assert_ne!(buffer.get(2, 2).style().bg, Some(ACCENT_BG));
    }

    #[test]
    fn comment_mode_swaps_prompt_and_help() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session
            .handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL))
            .unwrap();
        let terminal = draw(&session);

        assert_eq!(row(&terminal, 0), "Comment:");
        assert!(row(&terminal, 7).starts_with("Comment: Write a comment to save"));
        assert_eq!(row(&terminal, 2), "D * mocha");
        let buffer = terminal.backend().buffer();
        assert!(buffer.get(2, 3).style().add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn cursor_follows_typed_text() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        for ch in "lat".chars() {
            session
                .handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
                .unwrap();
        }
        let mut terminal = draw(&session);

        assert_eq!(row(&terminal, 0), "Search: lat");
        assert_eq!(row(&terminal, 2), "  latte   # warm");
        assert_eq!(terminal.get_cursor().unwrap(), (11, 0));
    }

    #[test]
    fn list_rows_excludes_chrome() {
        assert_eq!(list_rows(Rect::new(0, 0, 80, 24)), 21);
    }
}
