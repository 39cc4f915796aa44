//! TUI views and rendering

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::domain::{Example, TaskKind};
use crate::events::TimelineEvent;
use crate::scheduler::PhaseKind;

use super::state::{AppState, InteractionMode};

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    render_main(state, frame, chunks[1]);
    render_footer(state, frame, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        render_help_overlay(frame, chunks[1]);
    }
}

/// Render the header bar
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let snap = &state.snapshot;
    let phase_color = match snap.phase {
        PhaseKind::Idle => Color::DarkGray,
        PhaseKind::Macrotask => Color::Yellow,
        PhaseKind::Draining => Color::Green,
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled("evloop ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{:<9}", snap.phase), Style::default().fg(phase_color)),
        Span::raw(" │ "),
        Span::raw(format!("t={}ms", snap.now_ms)),
        Span::raw(" │ "),
        Span::raw(format!(
            "ticks {}  macro {}  micro {}",
            snap.stats.ticks, snap.stats.macrotasks_run, snap.stats.microtasks_run
        )),
        Span::raw(" │ "),
        Span::styled(format!("delay {}ms", state.delay_ms), Style::default().fg(Color::Magenta)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_main(state: &AppState, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25), // Call stack
            Constraint::Percentage(30), // Microtasks
            Constraint::Percentage(30), // Macrotasks
            Constraint::Min(5),         // Examples
        ])
        .split(columns[0]);

    render_call_stack(state, frame, left[0]);
    render_microtasks(state, frame, left[1]);
    render_macrotasks(state, frame, left[2]);
    render_examples(frame, left[3]);
    render_timeline(state, frame, columns[1]);
}

fn placeholder(text: &str) -> ListItem<'static> {
    ListItem::new(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray)))
}

/// Call stack, top frame first
fn render_call_stack(state: &AppState, frame: &mut Frame, area: Rect) {
    let stack = &state.snapshot.call_stack;
    let items: Vec<ListItem> = if stack.is_empty() {
        vec![placeholder("(empty)")]
    } else {
        stack
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let style = if i == 0 {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(label.clone(), style))
            })
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Call Stack "));
    frame.render_widget(list, area);
}

fn render_microtasks(state: &AppState, frame: &mut Frame, area: Rect) {
    let micro = &state.snapshot.microtasks;
    let items: Vec<ListItem> = if micro.is_empty() {
        vec![placeholder("(none)")]
    } else {
        micro
            .iter()
            .map(|label| ListItem::new(Span::styled(label.clone(), Style::default().fg(Color::Green))))
            .collect()
    };

    let title = format!(" Microtasks ({}) ", micro.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_macrotasks(state: &AppState, frame: &mut Frame, area: Rect) {
    let pending = &state.snapshot.macrotasks;
    let items: Vec<ListItem> = if pending.is_empty() {
        vec![placeholder("(none)")]
    } else {
        pending
            .iter()
            .map(|item| {
                let kind_color = match item.kind {
                    TaskKind::Raf => Color::Magenta,
                    _ => Color::Blue,
                };
                let (marker, marker_color) = if item.eligible {
                    ("ready".to_string(), Color::Green)
                } else {
                    (format!("in {}ms", item.remaining_ms), Color::Yellow)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<10}", item.label), Style::default().fg(kind_color)),
                    Span::styled(format!(" delay {:>4}ms ", item.delay_ms), Style::default().fg(Color::DarkGray)),
                    Span::styled(marker, Style::default().fg(marker_color)),
                ]))
            })
            .collect()
    };

    let title = format!(" Macrotasks ({}) ", pending.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_examples(frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = Example::ALL
        .iter()
        .enumerate()
        .map(|(i, example)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Cyan)),
                Span::raw(example.title()),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Examples "));
    frame.render_widget(list, area);
}

fn event_color(event: &TimelineEvent) -> Color {
    match event {
        TimelineEvent::Scheduled { .. } => Color::Gray,
        TimelineEvent::MacroStarted { .. } | TimelineEvent::MacroFinished { .. } => Color::Blue,
        TimelineEvent::DrainStarted { .. } => Color::Cyan,
        TimelineEvent::MicroStarted { .. } | TimelineEvent::MicroFinished { .. } => Color::Green,
        TimelineEvent::ExampleScheduled { .. } => Color::Magenta,
        TimelineEvent::Reset => Color::Red,
    }
}

/// Timeline, newest entry first
fn render_timeline(state: &AppState, frame: &mut Frame, area: Rect) {
    let log = &state.snapshot.log;
    let items: Vec<ListItem> = log
        .iter()
        .rev()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>7}ms ", entry.at_ms), Style::default().fg(Color::DarkGray)),
                Span::styled(entry.event.to_string(), Style::default().fg(event_color(&entry.event))),
            ]))
        })
        .collect();

    let title = format!(" Timeline ({}) ", log.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<11}", k), Style::default().fg(Color::Cyan)),
            Span::raw(desc),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
        key("m", "Add macrotask (uses current delay)"),
        key("u", "Add microtask"),
        key("f", "Add animation frame callback"),
        key("r", "Reset queues, stack and timeline"),
        key("1 2 3", "Run a scripted example"),
        key("+/-, ←/→", "Adjust macrotask delay"),
        Line::from(""),
        key("?, F1", "Toggle help"),
        key("q, Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "One macrotask per tick, then every queued microtask.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = match &state.status_message {
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Yellow))),
        None => Line::from(vec![
            Span::styled("m", Style::default().fg(Color::Cyan)),
            Span::raw(" macro  "),
            Span::styled("u", Style::default().fg(Color::Cyan)),
            Span::raw(" micro  "),
            Span::styled("f", Style::default().fg(Color::Cyan)),
            Span::raw(" raf  "),
            Span::styled("r", Style::default().fg(Color::Cyan)),
            Span::raw(" reset  "),
            Span::styled("1-3", Style::default().fg(Color::Cyan)),
            Span::raw(" examples  "),
            Span::styled("+/-", Style::default().fg(Color::Cyan)),
            Span::raw(" delay  "),
            Span::styled("?", Style::default().fg(Color::Cyan)),
            Span::raw(" help  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]),
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
