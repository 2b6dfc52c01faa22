//! Movie detail pane: right panel.

use bingebox_core::{
  detail::{DetailView, ImageTab},
  image::ImageSize,
};
use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Mode};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`. Draws nothing if no movie is open.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(detail) = app.view.detail() else {
    return;
  };
  let movie = &detail.movie;
  let annotations = app.book.annotations();

  let block = Block::default()
    .title(format!(" {} ", movie.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<10}", "year"), label),
      Span::raw(movie.year_label()),
      Span::styled(format!("   {:<7}", "score"), label),
      Span::raw(movie.score_label()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "poster"), label),
      Span::styled(movie.poster_url(ImageSize::W500), dim),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<10}", "backdrop"), label),
      Span::styled(movie.hero_url(), dim),
    ]),
    Line::from(""),
  ];

  if !movie.overview.is_empty() {
    lines.push(Line::from(movie.overview.clone()));
    lines.push(Line::from(""));
  }

  // Annotations.
  let stars = annotations.rating_for(movie.id).map_or(0, |s| s.get());
  lines.push(Line::from(vec![
    Span::styled(format!("{:<10}", "rating"), label),
    Span::styled(
      format!("{}{}", "★".repeat(stars.into()), "☆".repeat(5 - usize::from(stars))),
      Style::default().fg(Color::Yellow),
    ),
  ]));
  let favorite = annotations.is_favorite(movie.id);
  lines.push(Line::from(vec![
    Span::styled(format!("{:<10}", "favorite"), label),
    if favorite {
      Span::styled("♥ yes", Style::default().fg(Color::Red))
    } else {
      Span::styled("no", dim)
    },
  ]));
  lines.push(Line::from(""));

  image_lines(detail, &mut lines);
  lines.push(Line::from(""));

  // Comments.
  let comments = annotations.comments_for(movie.id);
  lines.push(Line::from(Span::styled(
    format!("Comments ({})", comments.len()),
    label,
  )));
  if app.mode == Mode::Comment {
    lines.push(Line::from(Span::styled(
      format!("> {}_", app.comment_input),
      Style::default().fg(Color::Yellow),
    )));
  }
  if comments.is_empty() {
    lines.push(Line::from(Span::styled("No comments yet.", dim)));
  }
  for (i, comment) in comments.iter().enumerate() {
    let when = comment
      .timestamp
      .with_timezone(&Local)
      .format("%Y-%m-%d %H:%M");
    let text_style = if i == app.comment_cursor {
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
    } else {
      Style::default()
    };
    lines.push(Line::from(vec![
      Span::styled(format!("{} · {when}  ", comment.author), dim),
      Span::styled(comment.text.clone(), text_style),
    ]));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Images ───────────────────────────────────────────────────────────────────

fn image_lines(detail: &DetailView, lines: &mut Vec<Line<'static>>) {
  let tab_span = |tab: ImageTab, name: &str| {
    let text = format!(" {name} ({}) ", detail.images_in(tab).len());
    if tab == detail.tab {
      Span::styled(
        text,
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan),
      )
    } else {
      Span::styled(text, Style::default().fg(Color::Gray))
    }
  };
  lines.push(Line::from(vec![
    tab_span(ImageTab::Backdrops, "Backdrops"),
    Span::raw(" "),
    tab_span(ImageTab::Posters, "Posters"),
  ]));

  let dim = Style::default().fg(Color::DarkGray);
  if detail.is_loading() {
    lines.push(Line::from(Span::styled("Loading images…", dim)));
    return;
  }
  let urls = detail.visible_image_urls();
  if urls.is_empty() {
    lines.push(Line::from(Span::styled("No images.", dim)));
  }
  for url in urls {
    lines.push(Line::from(Span::styled(url, dim)));
  }
}
