//! Image reference resolution.
//!
//! The catalog hands out path fragments such as `/d5NXSklXo0qyIYkgV94XAgMIckC.jpg`;
//! a fragment plus a size token composes into a full URL on the image host.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Base URL of the catalog's image host.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Local stand-in used when a movie has no image for a slot.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-movie.jpg";

/// The fixed set of rendition widths the image host serves.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageSize {
  /// Small: list thumbnails.
  W185,
  /// Medium: the default poster size.
  #[default]
  W500,
  W780,
  /// Large: hero backdrops.
  W1280,
  Original,
}

/// Resolve a path fragment at `size`. An absent or empty fragment resolves to
/// [`PLACEHOLDER_IMAGE`].
pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
  match path {
    Some(p) if !p.is_empty() => format!("{IMAGE_BASE_URL}/{size}{p}"),
    _ => PLACEHOLDER_IMAGE.to_owned(),
  }
}
