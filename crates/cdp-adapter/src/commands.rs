//! Query parameter types exposed by the adapter interface.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Strategy used to interpret a locator expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    #[serde(rename = "xpath")]
    XPath,
    Css,
    Id,
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            By::XPath => "xpath",
            By::Css => "css",
            By::Id => "id",
        };
        f.write_str(label)
    }
}

/// Immutable (strategy, expression) pair identifying zero or more elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub by: By,
    pub expression: Cow<'static, str>,
}

impl Locator {
    pub const fn xpath(expression: &'static str) -> Self {
        Self {
            by: By::XPath,
            expression: Cow::Borrowed(expression),
        }
    }

    pub const fn css(expression: &'static str) -> Self {
        Self {
            by: By::Css,
            expression: Cow::Borrowed(expression),
        }
    }

    pub const fn id(expression: &'static str) -> Self {
        Self {
            by: By::Id,
            expression: Cow::Borrowed(expression),
        }
    }

    pub fn new(by: By, expression: impl Into<String>) -> Self {
        Self {
            by,
            expression: Cow::Owned(expression.into()),
        }
    }

    /// CSS form of a by-id locator; other strategies are returned untouched.
    pub fn as_css(&self) -> Option<String> {
        match self.by {
            By::Css => Some(self.expression.to_string()),
            By::Id => Some(format!("[id=\"{}\"]", self.expression.replace('"', "\\\""))),
            By::XPath => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by, self.expression)
    }
}

/// Named keys the driver can press on a focused element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    ArrowDown,
    Escape,
    Tab,
}

impl Key {
    pub fn dom_key(&self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::ArrowDown => "ArrowDown",
            Key::Escape => "Escape",
            Key::Tab => "Tab",
        }
    }

    pub fn virtual_key_code(&self) -> i64 {
        match self {
            Key::Enter => 13,
            Key::ArrowDown => 40,
            Key::Escape => 27,
            Key::Tab => 9,
        }
    }

    /// Text the key produces when typed, if any.
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Key::Enter => Some("\r"),
            Key::Tab => Some("\t"),
            _ => None,
        }
    }
}
