//! Movie detail view state.
//!
//! A detail view is opened for one movie and fetches that movie's image set.
//! The image set is never cached: closing the view drops it and opening the
//! view again fetches it again.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
  image::{ImageSize, image_url},
  movie::{ImageSet, Movie, MovieImage},
};

/// At most this many images are shown per tab.
pub const MAX_IMAGES_PER_TAB: usize = 12;

/// Which half of the fetched image set is on display.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageTab {
  #[default]
  Backdrops,
  Posters,
}

impl ImageTab {
  /// The rendition each tab is resolved at.
  pub fn image_size(self) -> ImageSize {
    match self {
      Self::Backdrops => ImageSize::W780,
      Self::Posters => ImageSize::W500,
    }
  }

  pub fn other(self) -> Self {
    match self {
      Self::Backdrops => Self::Posters,
      Self::Posters => Self::Backdrops,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
  pub movie:  Movie,
  pub tab:    ImageTab,
  /// `None` while the image fetch is in flight.
  images:     Option<ImageSet>,
  /// Sequence number of the image fetch this view is waiting on.
  pub(crate) seq: u64,
}

impl DetailView {
  pub(crate) fn new(movie: Movie, seq: u64) -> Self {
    Self {
      movie,
      tab: ImageTab::default(),
      images: None,
      seq,
    }
  }

  pub(crate) fn set_images(&mut self, images: ImageSet) { self.images = Some(images); }

  pub fn is_loading(&self) -> bool { self.images.is_none() }

  pub fn images(&self) -> Option<&ImageSet> { self.images.as_ref() }

  pub fn set_tab(&mut self, tab: ImageTab) { self.tab = tab; }

  pub fn toggle_tab(&mut self) { self.tab = self.tab.other(); }

  /// Every fetched image in `tab`; empty while loading.
  pub fn images_in(&self, tab: ImageTab) -> &[MovieImage] {
    match (&self.images, tab) {
      (Some(set), ImageTab::Backdrops) => &set.backdrops,
      (Some(set), ImageTab::Posters) => &set.posters,
      (None, _) => &[],
    }
  }

  /// The images shown for the active tab, capped at [`MAX_IMAGES_PER_TAB`].
  pub fn visible_images(&self) -> &[MovieImage] {
    let all = self.images_in(self.tab);
    &all[..all.len().min(MAX_IMAGES_PER_TAB)]
  }

  /// Resolved URLs of [`Self::visible_images`].
  pub fn visible_image_urls(&self) -> Vec<String> {
    let size = self.tab.image_size();
    self
      .visible_images()
      .iter()
      .map(|img| image_url(Some(&img.file_path), size))
      .collect()
  }
}
