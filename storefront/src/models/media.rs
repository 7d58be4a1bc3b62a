// harvest_store/src/models/media.rs

use serde::{Deserialize, Serialize};

/// A product image as stored on the record: either a full external URL or
/// the filename of an upload served under `/images/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct MediaRef(String);

impl MediaRef {
  /// `None` for blank input.
  pub fn new(raw: impl Into<String>) -> Option<Self> {
    let raw = raw.into();
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| MediaRef(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_external_url(&self) -> bool {
    let lower = self.0.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
  }

  /// URL a client can fetch the image from.
  pub fn resolve(&self, public_base_url: &str) -> String {
    if self.is_external_url() {
      self.0.clone()
    } else {
      format!(
        "{}/images/{}",
        public_base_url.trim_end_matches('/'),
        self.0.trim_start_matches('/')
      )
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn external_urls_resolve_to_themselves() {
    let media = MediaRef::new("https://images.unsplash.com/photo-1.jpg").unwrap();
    assert!(media.is_external_url());
    assert_eq!(media.resolve("http://localhost:5000"), "https://images.unsplash.com/photo-1.jpg");
    assert!(MediaRef::new("HTTP://example.com/a.png").unwrap().is_external_url());
  }

  #[test]
  fn filenames_resolve_under_images_mount() {
    let media = MediaRef::new("image-1700000000.jpg").unwrap();
    assert!(!media.is_external_url());
    assert_eq!(
      media.resolve("http://localhost:5000/"),
      "http://localhost:5000/images/image-1700000000.jpg"
    );
    // A bare "http" prefix without a scheme separator is still a filename.
    assert!(!MediaRef::new("httpbin.png").unwrap().is_external_url());
  }

  #[test]
  fn blank_input_is_no_media() {
    assert!(MediaRef::new("   ").is_none());
  }
}
