//! TUI rendering: orchestrates all panes.

pub mod movie_detail;
pub mod movie_list;

use bingebox_core::view::ActiveView;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let annotations = app.book.annotations();
  let tabs = [
    (ActiveView::Discover, "1", "Discover".to_string()),
    (
      ActiveView::Favorites,
      "2",
      format!("Favorites ({})", annotations.favorites_count()),
    ),
    (
      ActiveView::Rated,
      "3",
      format!("Rated ({})", annotations.rated_count()),
    ),
  ];

  let mut spans = vec![Span::styled(
    " bingebox ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  for (view, key, label) in tabs {
    let style = if view == app.view.active_view() {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" [{key}] {label} "), style));
  }

  if app.view.is_busy() {
    spans.push(Span::styled(
      "  loading…",
      Style::default().fg(Color::Yellow),
    ));
  }

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  movie_list::draw(f, cols[0], app);

  if app.view.detail().is_some() {
    movie_detail::draw(f, cols[1], app);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select a movie and press Enter.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.mode {
    Mode::Search => ("SEARCH", "Type a title  Enter search  Esc cancel"),
    Mode::Comment => ("COMMENT", "Type a comment  Enter post  Esc cancel"),
    Mode::Normal if app.view.detail().is_some() => (
      "DETAIL",
      "1-5 rate  f favorite  c comment  jk select  d delete  t images  Esc back  q quit",
    ),
    Mode::Normal => (
      "NORMAL",
      "1/2/3 view  jk navigate  / search  Enter detail  f favorite  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
