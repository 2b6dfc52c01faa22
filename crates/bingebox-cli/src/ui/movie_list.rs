//! Movie list pane: left panel.

use bingebox_core::view::ActiveView;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Mode};

/// Render the displayed list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let displayed = app.displayed();
  let annotations = app.book.annotations();

  let title = match app.view.active_view() {
    ActiveView::Discover => format!(" Discover ({}) ", displayed.len()),
    ActiveView::Favorites => format!(" Favorites ({}) ", displayed.len()),
    ActiveView::Rated => format!(" Rated ({}) ", displayed.len()),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = displayed
    .iter()
    .map(|movie| {
      let mut spans = vec![
        Span::styled(
          format!("{:>4} ", movie.score_label()),
          Style::default().fg(Color::Yellow),
        ),
        Span::raw(movie.title.clone()),
        Span::styled(
          format!(" ({})", movie.year_label()),
          Style::default().fg(Color::DarkGray),
        ),
      ];

      if annotations.is_favorite(movie.id) {
        spans.push(Span::styled(" ♥", Style::default().fg(Color::Red)));
      }
      if let Some(stars) = annotations.rating_for(movie.id) {
        spans.push(Span::styled(
          format!(" {}★", stars.get()),
          Style::default().fg(Color::Yellow),
        ));
      }
      let comments = annotations.comment_count(movie.id);
      if comments > 0 {
        spans.push(Span::styled(
          format!(" ✎{comments}"),
          Style::default().fg(Color::Cyan),
        ));
      }

      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search box on the bottom line while typing or when a query is set.
  let show_search = app.view.active_view() == ActiveView::Discover
    && (app.mode == Mode::Search || !app.search_input.is_empty());
  if show_search && inner_area.height > 2 {
    let search_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let text = if app.mode == Mode::Search {
      format!("/{}_", app.search_input)
    } else {
      format!("/{}", app.search_input)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  if displayed.is_empty() {
    let hint = match app.view.active_view() {
      _ if app.view.is_busy() => "Loading…",
      ActiveView::Discover => "No movies found.",
      ActiveView::Favorites => "No favorites in this list yet.",
      ActiveView::Rated => "No rated movies in this list yet.",
    };
    f.render_widget(
      Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
