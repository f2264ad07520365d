use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed location: `pathname?search#hash`.
///
/// `search` keeps its leading `?` and `hash` its leading `#`, both empty when
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
  pub pathname: String,
  pub search: String,
  pub hash: String,
}

impl Location {
  pub fn parse(raw: &str) -> Self {
    let (rest, hash) = match raw.find('#') {
      Some(i) => (&raw[..i], raw[i..].to_string()),
      None => (raw, String::new()),
    };
    let (path, search) = match rest.find('?') {
      Some(i) => (&rest[..i], rest[i..].to_string()),
      None => (rest, String::new()),
    };

    let pathname = if path.starts_with('/') {
      path.to_string()
    } else {
      format!("/{}", path)
    };

    Self {
      pathname,
      search: if search == "?" { String::new() } else { search },
      hash: if hash == "#" { String::new() } else { hash },
    }
  }

  /// Returns true if this location lies at or below `base`.
  pub fn is_under(&self, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
      return true;
    }
    self.pathname == base
      || self
        .pathname
        .strip_prefix(base)
        .is_some_and(|rest| rest.starts_with('/'))
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.pathname, self.search, self.hash)
  }
}

impl From<&str> for Location {
  fn from(raw: &str) -> Self {
    Self::parse(raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full() {
    let location = Location::parse("/roles/42?tab=members#top");
    assert_eq!(location.pathname, "/roles/42");
    assert_eq!(location.search, "?tab=members");
    assert_eq!(location.hash, "#top");
    assert_eq!(location.to_string(), "/roles/42?tab=members#top");
  }

  #[test]
  fn test_parse_adds_leading_slash() {
    assert_eq!(Location::parse("users").pathname, "/users");
    assert_eq!(Location::parse("").pathname, "/");
  }

  #[test]
  fn test_parse_hash_before_search_is_hash() {
    let location = Location::parse("/a#frag?not-search");
    assert_eq!(location.search, "");
    assert_eq!(location.hash, "#frag?not-search");
  }

  #[test]
  fn test_is_under() {
    let location = Location::parse("/authorize/roles");
    assert!(location.is_under("/authorize"));
    assert!(location.is_under("/authorize/"));
    assert!(location.is_under("/"));
    assert!(!location.is_under("/auth"));
  }
}
