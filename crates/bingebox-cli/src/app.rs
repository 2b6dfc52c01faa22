//! Application state machine and event dispatcher.

use std::sync::Arc;

use bingebox_core::{
  book::AnnotationBook,
  movie::{ImageSet, Movie},
  view::{ActiveView, ImageFetch, ListFetch, ViewState},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::{client::RelayClient, store::LocalStore};

// ─── Input mode ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  /// Typing into the search box.
  Search,
  /// Typing a comment for the movie open in the detail pane.
  Comment,
}

// ─── Fetch outcomes ───────────────────────────────────────────────────────────

/// A finished fetch, sent back to the event loop by the task that ran it.
/// `None` means the fetch failed.
#[derive(Debug)]
pub enum Outcome {
  List { seq: u64, movies: Option<Vec<Movie>> },
  Images { seq: u64, images: Option<ImageSet> },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// What is shown and which fetches are outstanding.
  pub view: ViewState,

  /// Ratings, favorites and comments, written through to the local store.
  pub book: AnnotationBook<LocalStore>,

  pub mode: Mode,

  /// Search box contents. Kept after submission so it can be edited.
  pub search_input: String,

  pub comment_input: String,

  /// Cursor position within the displayed list.
  pub list_cursor: usize,

  /// Cursor position within the open movie's comments.
  pub comment_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  client: Arc<RelayClient>,
  tx:     UnboundedSender<Outcome>,
}

impl App {
  pub fn new(
    client: RelayClient,
    book: AnnotationBook<LocalStore>,
    tx: UnboundedSender<Outcome>,
  ) -> Self {
    Self {
      view: ViewState::new(),
      book,
      mode: Mode::Normal,
      search_input: String::new(),
      comment_input: String::new(),
      list_cursor: 0,
      comment_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
      tx,
    }
  }

  /// Enter the Discover view and request the popular list.
  pub fn start(&mut self) {
    if let Some(fetch) = self.view.startup() {
      self.dispatch_list(fetch);
    }
  }

  // ── Fetching ──────────────────────────────────────────────────────────────

  fn dispatch_list(&mut self, fetch: ListFetch) {
    debug!(seq = fetch.seq, query = ?fetch.query, "list fetch");
    self.status_msg = "Loading movies…".into();
    let client = self.client.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let movies = match client.list(&fetch.query).await {
        Ok(movies) => Some(movies),
        Err(e) => {
          warn!(seq = fetch.seq, "list fetch failed: {e:#}");
          None
        }
      };
      // The receiver only goes away on quit.
      let _ = tx.send(Outcome::List {
        seq: fetch.seq,
        movies,
      });
    });
  }

  fn dispatch_images(&mut self, fetch: ImageFetch) {
    debug!(seq = fetch.seq, movie_id = %fetch.movie_id, "image fetch");
    let client = self.client.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let images = match client.images(fetch.movie_id).await {
        Ok(images) => Some(images),
        Err(e) => {
          warn!(seq = fetch.seq, "image fetch failed: {e:#}");
          None
        }
      };
      let _ = tx.send(Outcome::Images {
        seq: fetch.seq,
        images,
      });
    });
  }

  /// Fold a finished fetch into the view. Stale outcomes are dropped.
  pub fn apply(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::List { seq, movies } => {
        let failed = movies.is_none();
        if !self.view.complete_list(seq, movies) {
          debug!(seq, "stale list outcome dropped");
          return;
        }
        self.list_cursor = 0;
        self.status_msg = if failed {
          "Could not load movies.".into()
        } else if self.view.movies().is_empty() {
          "No movies found.".into()
        } else {
          String::new()
        };
      }
      Outcome::Images { seq, images } => {
        let failed = images.is_none();
        if !self.view.complete_images(seq, images) {
          debug!(seq, "stale image outcome dropped");
          return;
        }
        if failed {
          self.status_msg = "Could not load images.".into();
        }
      }
    }
  }

  // ── Derived list ──────────────────────────────────────────────────────────

  pub fn displayed(&self) -> Vec<&Movie> { self.view.displayed(self.book.annotations()) }

  /// The movie under the list cursor, if any.
  pub fn cursor_movie(&self) -> Option<&Movie> {
    self.displayed().get(self.list_cursor).copied()
  }

  fn switch_view(&mut self, view: ActiveView) {
    if let Some(fetch) = self.view.switch_view(view) {
      self.dispatch_list(fetch);
    }
    self.list_cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match self.mode {
      Mode::Search => {
        self.handle_search_key(key);
        true
      }
      Mode::Comment => {
        self.handle_comment_key(key).await;
        true
      }
      Mode::Normal if self.view.detail().is_some() => self.handle_detail_key(key).await,
      Mode::Normal => self.handle_list_key(key).await,
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.mode = Mode::Normal,
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        match self.view.submit_search(&self.search_input) {
          Some(fetch) => self.dispatch_list(fetch),
          None => self.status_msg = "A search is already running.".into(),
        }
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
  }

  async fn handle_comment_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.comment_input.clear();
      }
      KeyCode::Enter => {
        self.mode = Mode::Normal;
        let text = std::mem::take(&mut self.comment_input);
        if let Some(movie_id) = self.view.comment_target()
          && self.book.add_comment(movie_id, &text).await.is_some()
        {
          self.comment_cursor = 0;
        }
      }
      KeyCode::Backspace => {
        self.comment_input.pop();
      }
      KeyCode::Char(c) => self.comment_input.push(c),
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Views
      KeyCode::Char('1') => self.switch_view(ActiveView::Discover),
      KeyCode::Char('2') => self.switch_view(ActiveView::Favorites),
      KeyCode::Char('3') => self.switch_view(ActiveView::Rated),
      KeyCode::Tab => self.switch_view(next_view(self.view.active_view())),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.displayed().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(movie) = self.cursor_movie().cloned() {
          self.open_detail(movie);
        }
      }

      KeyCode::Char('/') => {
        if self.view.active_view() == ActiveView::Discover {
          self.mode = Mode::Search;
        } else {
          self.status_msg = "Search is only available in Discover.".into();
        }
      }

      KeyCode::Char('f') => {
        if let Some(id) = self.cursor_movie().map(|m| m.id) {
          self.book.toggle_favorite(id).await;
          self.clamp_list_cursor();
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    let Some(movie_id) = self.view.comment_target() else {
      return true;
    };

    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.view.close_detail();
        self.clamp_list_cursor();
      }

      KeyCode::Char(c @ '1'..='5') => {
        let value = c as u8 - b'0';
        self.book.upsert_rating(movie_id, value).await;
      }
      KeyCode::Char('f') => {
        self.book.toggle_favorite(movie_id).await;
      }
      KeyCode::Char('c') => {
        self.mode = Mode::Comment;
        self.comment_input.clear();
      }
      KeyCode::Char('t') => {
        if let Some(detail) = self.view.detail_mut() {
          detail.toggle_tab();
        }
      }

      // Comments
      KeyCode::Down | KeyCode::Char('j') => {
        let count = self.book.annotations().comment_count(movie_id);
        if self.comment_cursor + 1 < count {
          self.comment_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.comment_cursor = self.comment_cursor.saturating_sub(1);
      }
      KeyCode::Char('d') => {
        let id = self
          .book
          .annotations()
          .comments_for(movie_id)
          .get(self.comment_cursor)
          .map(|c| c.id.clone());
        if let Some(id) = id {
          self.book.delete_comment(&id).await;
          let count = self.book.annotations().comment_count(movie_id);
          self.comment_cursor = self.comment_cursor.min(count.saturating_sub(1));
        }
      }

      _ => {}
    }
    true
  }

  fn open_detail(&mut self, movie: Movie) {
    let fetch = self.view.open_detail(movie);
    self.comment_cursor = 0;
    self.dispatch_images(fetch);
  }

  /// Keep the cursor inside the displayed list, which shrinks when a
  /// favorite is removed in the Favorites view.
  fn clamp_list_cursor(&mut self) {
    let len = self.displayed().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }
}

fn next_view(view: ActiveView) -> ActiveView {
  match view {
    ActiveView::Discover => ActiveView::Favorites,
    ActiveView::Favorites => ActiveView::Rated,
    ActiveView::Rated => ActiveView::Discover,
  }
}

#[cfg(test)]
mod tests {
  use bingebox_core::{
    movie::{MovieId, MovieImage},
    store::MemoryStore,
    view::Trigger,
  };
  use tokio::sync::mpsc::{self, UnboundedReceiver};

  use super::*;

  async fn app() -> (App, UnboundedReceiver<Outcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    // Nothing listens here; spawned fetches fail and report `None`.
    let client = RelayClient::new("http://127.0.0.1:9").unwrap();
    let book = AnnotationBook::open(Arc::new(LocalStore::Memory(MemoryStore::new())))
      .await
      .unwrap();
    (App::new(client, book, tx), rx)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn movies(ids: &[u64]) -> Vec<Movie> {
    ids.iter().map(|&id| Movie::new(id, format!("Movie {id}"))).collect()
  }

  async fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
  }

  #[tokio::test]
  async fn startup_loads_the_popular_list() {
    let (mut app, _rx) = app().await;
    app.start();
    assert_eq!(app.view.busy_trigger(), Some(Trigger::ViewEntry));

    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[1, 2, 3])),
    });
    assert!(!app.view.is_busy());
    assert_eq!(app.displayed().len(), 3);
    assert!(app.status_msg.is_empty());
  }

  #[tokio::test]
  async fn failed_fetch_reports_and_empties_the_list() {
    let (mut app, _rx) = app().await;
    app.start();
    app.apply(Outcome::List {
      seq:    1,
      movies: None,
    });
    assert!(app.displayed().is_empty());
    assert!(!app.view.is_busy());
    assert_eq!(app.status_msg, "Could not load movies.");
  }

  #[tokio::test]
  async fn search_box_submits_trimmed_input() {
    let (mut app, _rx) = app().await;
    app.start();
    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[1])),
    });

    app.handle_key(key(KeyCode::Char('/'))).await;
    assert_eq!(app.mode, Mode::Search);
    type_text(&mut app, "  dune ").await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.view.busy_trigger(), Some(Trigger::Search));

    app.apply(Outcome::List {
      seq:    2,
      movies: Some(vec![Movie::new(438631, "Dune")]),
    });
    let shown = app.displayed();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Dune");
  }

  #[tokio::test]
  async fn search_is_refused_outside_discover() {
    let (mut app, _rx) = app().await;
    app.handle_key(key(KeyCode::Char('2'))).await;
    app.handle_key(key(KeyCode::Char('/'))).await;
    assert_eq!(app.mode, Mode::Normal);
    assert!(!app.view.is_busy());
  }

  #[tokio::test]
  async fn stale_list_outcome_is_ignored() {
    let (mut app, _rx) = app().await;
    app.start();
    app.handle_key(key(KeyCode::Char('/'))).await;
    type_text(&mut app, "alien").await;
    app.handle_key(key(KeyCode::Enter)).await;

    app.apply(Outcome::List {
      seq:    2,
      movies: Some(movies(&[7])),
    });
    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[1, 2, 3])),
    });
    assert_eq!(app.displayed()[0].id, MovieId(7));
    assert_eq!(app.displayed().len(), 1);
  }

  #[tokio::test]
  async fn favorites_view_filters_the_fetched_list() {
    let (mut app, _rx) = app().await;
    app.start();
    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[1, 2])),
    });

    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Char('f'))).await;
    app.handle_key(key(KeyCode::Char('2'))).await;

    let ids: Vec<_> = app.displayed().iter().map(|m| m.id.0).collect();
    assert_eq!(ids, vec![2]);
    assert_eq!(app.list_cursor, 0);

    // Unfavoriting from the Favorites view keeps the cursor in range.
    app.handle_key(key(KeyCode::Char('f'))).await;
    assert!(app.displayed().is_empty());
    assert_eq!(app.list_cursor, 0);
  }

  #[tokio::test]
  async fn detail_keys_annotate_the_open_movie() {
    let (mut app, _rx) = app().await;
    app.start();
    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[42])),
    });
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.view.detail().is_some_and(|d| d.is_loading()));

    app.handle_key(key(KeyCode::Char('4'))).await;
    app.handle_key(key(KeyCode::Char('f'))).await;
    app.handle_key(key(KeyCode::Char('c'))).await;
    type_text(&mut app, " great ").await;
    app.handle_key(key(KeyCode::Enter)).await;

    // A blank comment is ignored.
    app.handle_key(key(KeyCode::Char('c'))).await;
    type_text(&mut app, "   ").await;
    app.handle_key(key(KeyCode::Enter)).await;

    let a = app.book.annotations();
    let id = MovieId(42);
    assert_eq!(a.rating_for(id).map(|s| s.get()), Some(4));
    assert!(a.is_favorite(id));
    assert_eq!(a.comment_count(id), 1);
    assert_eq!(a.comments_for(id)[0].text, "great");

    app.handle_key(key(KeyCode::Char('d'))).await;
    assert_eq!(app.book.annotations().comment_count(id), 0);
  }

  #[tokio::test]
  async fn reopening_detail_discards_the_old_image_outcome() {
    let (mut app, _rx) = app().await;
    app.start();
    app.apply(Outcome::List {
      seq:    1,
      movies: Some(movies(&[1, 2])),
    });

    app.handle_key(key(KeyCode::Enter)).await;
    app.handle_key(key(KeyCode::Esc)).await;
    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Enter)).await;

    let set = ImageSet {
      backdrops: vec![MovieImage {
        file_path:    "/b.jpg".into(),
        width:        None,
        height:       None,
        aspect_ratio: None,
        vote_average: None,
      }],
      posters:   vec![],
    };
    app.apply(Outcome::Images {
      seq:    1,
      images: Some(set.clone()),
    });
    assert!(app.view.detail().is_some_and(|d| d.is_loading()));

    app.apply(Outcome::Images {
      seq:    2,
      images: Some(set),
    });
    let detail = app.view.detail().unwrap();
    assert_eq!(detail.movie.id, MovieId(2));
    assert_eq!(detail.visible_images().len(), 1);
  }
}
