use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    PageRuntime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HtmlParse(msg) => write!(f, "failed to parse html: {msg}"),
            Error::UnsupportedSelector(selector) => {
                write!(f, "selector syntax not supported: {selector}")
            }
            Error::SelectorNotFound(selector) => {
                write!(f, "no element matches selector: {selector}")
            }
            Error::TypeMismatch {
                selector,
                expected,
                actual,
            } => {
                write!(f, "wrong element kind for {selector}: wanted {expected}, found {actual}")
            }
            Error::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion on {selector} failed: expected {expected}, found {actual} (dom: {dom_snippet})"
            ),
            Error::PageRuntime(msg) => write!(f, "page error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

mod behavior;
mod dom;
mod event;
mod html;
mod page;
mod schedule;
mod selector;
mod trace;

#[cfg(test)]
mod tests;

pub use page::{FormSubmission, Page, ScrollRecord};
pub use schedule::PendingTimer;
