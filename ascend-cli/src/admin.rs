//! `ascend admin`: the password gate and task form as a terminal UI.

use anyhow::{Context, Result};
use ascend_core::{
    AdminSession, LifeColumn, RewardField, TaskForm, TaskSink, MAX_REWARD_XP, MIN_REWARD_XP,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::future::Future;
use std::io::{self, Stdout};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Frequency,
    Title,
    CoverPrompt,
    Description,
    Reward(usize),
    AddReward,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Submit,
    Quit,
}

struct AdminView {
    session: AdminSession,
    password: String,
    focus: Focus,
}

impl AdminView {
    fn new() -> Self {
        Self {
            session: AdminSession::new(),
            password: String::new(),
            focus: Focus::Title,
        }
    }

    fn focus_order(form: &TaskForm) -> Vec<Focus> {
        let mut order = vec![Focus::Frequency, Focus::Title, Focus::CoverPrompt, Focus::Description];
        order.extend((0..form.rewards().len()).map(Focus::Reward));
        if form.can_add_reward() {
            order.push(Focus::AddReward);
        }
        order.push(Focus::Submit);
        order
    }

    fn move_focus(&mut self, forward: bool) {
        let Some(form) = self.session.form() else { return };
        let order = Self::focus_order(form);
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Keep focus on something that still exists after the reward list changed.
    fn fix_focus(&mut self) {
        let Some(form) = self.session.form() else { return };
        let order = Self::focus_order(form);
        if order.contains(&self.focus) {
            return;
        }
        self.focus = match self.focus {
            Focus::Reward(_) => Focus::Reward(form.rewards().len() - 1),
            _ => Focus::Submit,
        };
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            return Action::Quit;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        if self.session.is_unlocked() {
            self.handle_form_key(key)
        } else {
            self.handle_gate_key(key);
            Action::None
        }
    }

    fn handle_gate_key(&mut self, key: KeyEvent) {
        if is_control_char(key) {
            return;
        }
        match key.code {
            KeyCode::Enter => {
                if self.session.attempt_unlock(&self.password) {
                    self.password.clear();
                    self.focus = Focus::Title;
                }
            }
            KeyCode::Backspace => {
                self.password.pop();
            }
            KeyCode::Char(c) => self.password.push(c),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Action {
        if self.session.is_busy() {
            return Action::None;
        }
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Submit;
        }
        if is_control_char(key) {
            return Action::None;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                return Action::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                return Action::None;
            }
            _ => {}
        }

        let focus = self.focus;
        let Some(form) = self.session.form_mut() else {
            return Action::None;
        };

        match focus {
            Focus::Frequency => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                    let next = form.frequency().toggle();
                    form.set_frequency(next.as_str());
                }
                KeyCode::Enter => self.move_focus(true),
                _ => {}
            },
            Focus::Title => match edit_text(form.title(), key) {
                Edit::Changed(v) => form.set_title(&v),
                Edit::Enter => self.move_focus(true),
                Edit::Ignored => {}
            },
            Focus::CoverPrompt => match edit_text(form.cover_prompt(), key) {
                Edit::Changed(v) => form.set_cover_prompt(&v),
                Edit::Enter => self.move_focus(true),
                Edit::Ignored => {}
            },
            Focus::Description => match edit_text(form.description(), key) {
                Edit::Changed(v) => form.set_description(&v),
                Edit::Enter => self.move_focus(true),
                Edit::Ignored => {}
            },
            Focus::Reward(i) => {
                edit_reward(form, i, key);
                self.fix_focus();
            }
            Focus::AddReward => {
                if key.code == KeyCode::Enter {
                    form.add_reward();
                    let last = form.rewards().len() - 1;
                    self.focus = Focus::Reward(last);
                }
            }
            Focus::Submit => {
                if key.code == KeyCode::Enter {
                    return Action::Submit;
                }
            }
        }
        Action::None
    }
}

/// Ctrl+<char> chords are shortcuts, never text.
fn is_control_char(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(KeyModifiers::CONTROL)
}

enum Edit {
    Changed(String),
    Enter,
    Ignored,
}

fn edit_text(current: &str, key: KeyEvent) -> Edit {
    match key.code {
        KeyCode::Char(c) => {
            let mut s = current.to_string();
            s.push(c);
            Edit::Changed(s)
        }
        KeyCode::Backspace => {
            let mut s = current.to_string();
            s.pop();
            Edit::Changed(s)
        }
        KeyCode::Enter => Edit::Enter,
        _ => Edit::Ignored,
    }
}

fn edit_reward(form: &mut TaskForm, index: usize, key: KeyEvent) {
    let Some(reward) = form.rewards().get(index).cloned() else {
        return;
    };
    match key.code {
        KeyCode::Left => form.update_reward(index, RewardField::Column, reward.column.prev().as_str()),
        KeyCode::Right => form.update_reward(index, RewardField::Column, reward.column.next().as_str()),
        KeyCode::Char('+') => {
            let xp = (reward.xp + 1).clamp(MIN_REWARD_XP, MAX_REWARD_XP);
            form.update_reward(index, RewardField::Xp, &xp.to_string());
        }
        KeyCode::Char('-') => {
            let xp = (reward.xp - 1).clamp(MIN_REWARD_XP, MAX_REWARD_XP);
            form.update_reward(index, RewardField::Xp, &xp.to_string());
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let typed = format!("{}{}", reward.xp, c);
            let xp = ascend_core::coerce_xp(&typed).min(MAX_REWARD_XP);
            form.update_reward(index, RewardField::Xp, &xp.to_string());
        }
        KeyCode::Backspace => {
            form.update_reward(index, RewardField::Xp, &(reward.xp / 10).to_string());
        }
        KeyCode::Delete | KeyCode::Char('x') => form.remove_reward(index),
        _ => {}
    }
}

/// Drive `fut` to completion from synchronous UI code.
fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        Ok(rt.block_on(fut))
    }
}

pub fn run_admin(sink: &dyn TaskSink) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = admin_loop(&mut terminal, sink);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn admin_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, sink: &dyn TaskSink) -> Result<()> {
    let mut view = AdminView::new();
    info!("admin session started");

    loop {
        terminal.draw(|f| draw(f, &view))?;

        if !event::poll(std::time::Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match view.handle_key(key) {
            Action::Quit => break,
            Action::Submit => {
                if let Ok(task) = view.session.begin_submit() {
                    // busy label goes up before the call blocks
                    terminal.draw(|f| draw(f, &view))?;
                    let result = block_on(sink.create_task(&task))?;
                    view.session.finish_submit(result);
                    view.fix_focus();
                }
            }
            Action::None => {}
        }
    }

    info!("admin session closed");
    Ok(())
}

fn draw(f: &mut Frame, view: &AdminView) {
    if view.session.is_unlocked() {
        draw_form(f, view);
    } else {
        draw_gate(f, view);
    }
}

fn draw_gate(f: &mut Frame, view: &AdminView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Length(8), Constraint::Min(0)])
        .split(f.area());
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(40), Constraint::Percentage(30)])
        .split(chunks[1]);

    let masked: String = "•".repeat(view.password.chars().count());
    let mut lines = vec![
        Line::from(Span::styled(
            "Ascend Admin Login",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![Span::styled("password: ", Style::default().fg(Color::Gray)), Span::raw(masked)]),
        Line::raw(""),
        Line::from(Span::styled("Enter to unlock, Esc to quit", Style::default().fg(Color::Gray))),
    ];
    if let Some(msg) = view.session.message() {
        lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Red))));
    }

    let gate = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(gate, row[1]);
}

fn field_line<'a>(focused: bool, label: String, value: String) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(label, label_style),
        Span::raw(value),
    ])
}

fn draw_form(f: &mut Frame, view: &AdminView) {
    let Some(form) = view.session.form() else { return };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(3)])
        .split(f.area());

    let status = match view.session.message() {
        Some(msg) => Span::styled(msg.to_string(), Style::default().fg(message_color(msg))),
        None => Span::raw(""),
    };
    let header = Paragraph::new(Line::from(status))
        .block(Block::default().borders(Borders::ALL).title("Create Ascend Task"));
    f.render_widget(header, chunks[0]);

    let focus = view.focus;
    let mut lines = vec![
        field_line(focus == Focus::Frequency, "Frequency: ".to_string(), format!("< {} >", form.frequency().as_str())),
        Line::raw(""),
        field_line(focus == Focus::Title, format!("Title ({}): ", form.title_counter()), form.title().to_string()),
        field_line(focus == Focus::CoverPrompt, "Cover prompt (for the image): ".to_string(), form.cover_prompt().to_string()),
        field_line(
            focus == Focus::Description,
            format!("Description ({}): ", form.description_counter()),
            form.description().to_string(),
        ),
        Line::raw(""),
        Line::from(Span::styled("  XP Rewards (1–3)", Style::default().fg(Color::Gray))),
    ];
    for (i, r) in form.rewards().iter().enumerate() {
        let column = match &r.column {
            LifeColumn::Other(raw) => format!("{raw} (unrecognized)"),
            c => c.label().to_string(),
        };
        lines.push(field_line(
            focus == Focus::Reward(i),
            format!("  #{} ", i + 1),
            format!("< {column} >  xp {}", r.xp),
        ));
    }
    if form.can_add_reward() {
        lines.push(field_line(focus == Focus::AddReward, "+ Add XP reward".to_string(), String::new()));
    }
    lines.push(Line::raw(""));
    let submit_label = format!("[ {} ]", view.session.submit_label());
    lines.push(field_line(focus == Focus::Submit, submit_label, String::new()));

    let body = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(body, chunks[1]);

    let help = Paragraph::new(Line::from(Span::styled(
        help_text(form),
        Style::default().fg(Color::Gray),
    )))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn help_text(form: &TaskForm) -> String {
    let mut keys = vec!["Tab/↑↓ move", "←→ change", "+/- xp"];
    if form.can_remove_reward() {
        keys.push("x remove reward");
    }
    keys.extend(["Ctrl+S submit", "Esc quit"]);
    keys.join("  ")
}

fn message_color(msg: &str) -> Color {
    if msg == ascend_core::CREATED_MESSAGE {
        Color::Green
    } else {
        Color::Red
    }
}
