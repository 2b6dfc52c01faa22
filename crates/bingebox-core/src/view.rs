//! The catalog query controller: what the client is showing and which
//! fetches it is waiting on.
//!
//! [`ViewState`] is plain data. Methods that need a fetch return a ticket
//! describing it; the caller performs the fetch and hands the outcome back
//! with the ticket's sequence number. Outcomes carrying anything but the
//! latest sequence number are discarded, so a slow response can never
//! overwrite a newer one.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
  annotation::Annotations,
  detail::DetailView,
  movie::{ImageSet, Movie, MovieId},
};

// ─── Views ───────────────────────────────────────────────────────────────────

/// The display mode selecting which derived list is shown.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActiveView {
  /// The last fetched catalog list, unfiltered.
  #[default]
  Discover,
  /// The last fetched list restricted to favorites.
  Favorites,
  /// The last fetched list restricted to rated movies.
  Rated,
}

/// What started a list fetch. A fetch in flight suppresses new fetches from
/// the same trigger only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
  /// Startup, or switching into [`ActiveView::Discover`].
  ViewEntry,
  /// A search box submission.
  Search,
}

/// The catalog request behind a list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "query", rename_all = "snake_case")]
pub enum CatalogQuery {
  Popular,
  Search(String),
}

impl CatalogQuery {
  /// A search for the trimmed `input`, or the popular list if it is blank.
  pub fn from_input(input: &str) -> Self {
    match input.trim() {
      "" => Self::Popular,
      q => Self::Search(q.to_owned()),
    }
  }
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// A list fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFetch {
  pub seq:   u64,
  pub query: CatalogQuery,
}

/// An image-set fetch the caller should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFetch {
  pub seq:      u64,
  pub movie_id: MovieId,
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Everything the client shows that is not an annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
  active_view: ActiveView,
  /// The most recently fetched result list.
  movies:      Vec<Movie>,
  /// Trigger of the latest list fetch while it is in flight.
  in_flight:   Option<Trigger>,
  list_seq:    u64,
  image_seq:   u64,
  detail:      Option<DetailView>,
}

impl ViewState {
  pub fn new() -> Self { Self::default() }

  pub fn active_view(&self) -> ActiveView { self.active_view }

  pub fn movies(&self) -> &[Movie] { &self.movies }

  /// Whether the latest list fetch is still outstanding.
  pub fn is_busy(&self) -> bool { self.in_flight.is_some() }

  pub fn busy_trigger(&self) -> Option<Trigger> { self.in_flight }

  // ── List fetches ──────────────────────────────────────────────────────

  /// Enter the initial view. Always asks for the popular list.
  pub fn startup(&mut self) -> Option<ListFetch> {
    self.active_view = ActiveView::Discover;
    self.issue(Trigger::ViewEntry, CatalogQuery::Popular)
  }

  /// Switch to `view`. Entering [`ActiveView::Discover`] from another view
  /// fetches the popular list; the other views never fetch.
  pub fn switch_view(&mut self, view: ActiveView) -> Option<ListFetch> {
    if view == self.active_view {
      return None;
    }
    self.active_view = view;
    match view {
      ActiveView::Discover => self.issue(Trigger::ViewEntry, CatalogQuery::Popular),
      ActiveView::Favorites | ActiveView::Rated => None,
    }
  }

  /// Submit the search box. Ignored outside [`ActiveView::Discover`].
  pub fn submit_search(&mut self, input: &str) -> Option<ListFetch> {
    if self.active_view != ActiveView::Discover {
      return None;
    }
    self.issue(Trigger::Search, CatalogQuery::from_input(input))
  }

  fn issue(&mut self, trigger: Trigger, query: CatalogQuery) -> Option<ListFetch> {
    if self.in_flight == Some(trigger) {
      return None;
    }
    self.list_seq += 1;
    self.in_flight = Some(trigger);
    Some(ListFetch {
      seq: self.list_seq,
      query,
    })
  }

  /// Apply the outcome of list fetch `seq`; `None` means it failed, which
  /// shows as an empty list. Returns whether the outcome was applied.
  pub fn complete_list(&mut self, seq: u64, movies: Option<Vec<Movie>>) -> bool {
    if seq != self.list_seq {
      return false;
    }
    self.movies = movies.unwrap_or_default();
    self.in_flight = None;
    true
  }

  // ── Derived list ──────────────────────────────────────────────────────

  /// The list for the active view.
  pub fn displayed<'a>(&'a self, annotations: &Annotations) -> Vec<&'a Movie> {
    filter_movies(&self.movies, self.active_view, annotations)
  }

  // ── Detail view ───────────────────────────────────────────────────────

  /// Open the detail view for `movie`, replacing any open one. Always
  /// fetches the image set anew.
  pub fn open_detail(&mut self, movie: Movie) -> ImageFetch {
    self.image_seq += 1;
    let fetch = ImageFetch {
      seq:      self.image_seq,
      movie_id: movie.id,
    };
    self.detail = Some(DetailView::new(movie, self.image_seq));
    fetch
  }

  pub fn close_detail(&mut self) { self.detail = None; }

  pub fn detail(&self) -> Option<&DetailView> { self.detail.as_ref() }

  pub fn detail_mut(&mut self) -> Option<&mut DetailView> { self.detail.as_mut() }

  /// The movie annotations from the detail view attach to, if one is open.
  pub fn comment_target(&self) -> Option<MovieId> {
    self.detail.as_ref().map(|d| d.movie.id)
  }

  /// Apply the outcome of image fetch `seq`; `None` means it failed, which
  /// shows as an empty set. Outcomes for a closed or replaced view are
  /// dropped.
  pub fn complete_images(&mut self, seq: u64, images: Option<ImageSet>) -> bool {
    match &mut self.detail {
      Some(detail) if detail.seq == seq => {
        detail.set_images(images.unwrap_or_default());
        true
      }
      _ => false,
    }
  }
}

/// Restrict `movies` to what `view` shows given `annotations`, keeping order.
pub fn filter_movies<'a>(
  movies: &'a [Movie],
  view: ActiveView,
  annotations: &Annotations,
) -> Vec<&'a Movie> {
  movies
    .iter()
    .filter(|m| match view {
      ActiveView::Discover => true,
      ActiveView::Favorites => annotations.is_favorite(m.id),
      ActiveView::Rated => annotations.is_rated(m.id),
    })
    .collect()
}
