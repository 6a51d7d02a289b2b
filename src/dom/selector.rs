//! The selector subset the view pipeline needs.
//!
//! A selector is one compound step: an optional tag name, an optional
//! `#id`, and at most one attribute condition (`[name]` or `[name='value']`).
//! Combinators and pseudo-classes are rejected.

use std::sync::LazyLock;

use regex::Regex;

use super::DomError;

static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<tag>[A-Za-z][A-Za-z0-9-]*)?(?:#(?P<id>[A-Za-z0-9_-]+))?(?:\[(?P<attr>[A-Za-z_][A-Za-z0-9_-]*)(?:='(?P<sq>[^']*)'|="(?P<dq>[^"]*)"|=(?P<bare>[A-Za-z0-9_-]+))?\])?$"#,
    )
    .unwrap()
});

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub attr: Option<(String, Option<String>)>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, DomError> {
        let trimmed = selector.trim();
        let caps = SELECTOR_RE
            .captures(trimmed)
            .filter(|_| !trimmed.is_empty())
            .ok_or_else(|| DomError::UnsupportedSelector(selector.to_string()))?;

        let value = caps
            .name("sq")
            .or_else(|| caps.name("dq"))
            .or_else(|| caps.name("bare"))
            .map(|m| m.as_str().to_string());

        Ok(Self {
            tag: caps.name("tag").map(|m| m.as_str().to_ascii_lowercase()),
            id: caps.name("id").map(|m| m.as_str().to_string()),
            attr: caps.name("attr").map(|m| (m.as_str().to_string(), value)),
        })
    }

    /// Whether an element with this tag and attribute lookup matches.
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(ref want) = self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(ref want) = self.id {
            if attr("id") != Some(want.as_str()) {
                return false;
            }
        }
        match &self.attr {
            None => true,
            Some((name, None)) => attr(name).is_some(),
            Some((name, Some(value))) => attr(name) == Some(value.as_str()),
        }
    }
}
