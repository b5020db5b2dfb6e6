//! Booking page enhancements for the AeroReserva flight search page.
//!
//! The behaviors run on a small deterministic page model instead of a live
//! browser: markup is parsed into a DOM, listeners are named [`Handler`]s, and
//! deferred work sits on a virtual clock that only moves when asked to.
//!
//! ```
//! use aeroreserva_ui::{Page, Severity};
//!
//! # fn main() -> aeroreserva_ui::Result<()> {
//! let mut page = Page::load(r#"
//!   <body>
//!     <div class="flight-card">MAD - BCN</div>
//!   </body>
//! "#)?;
//! page.hover(".flight-card")?;
//! page.assert_style(".flight-card", "transform", "translateY(-8px)")?;
//!
//! page.notify("Booking confirmed", Severity::Success)?;
//! page.assert_count(".alert", 1)?;
//! page.advance_time(5000)?;
//! page.assert_count(".alert", 0)?;
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt;

mod config;
mod dom;
mod enhancements;
mod events;
mod html;
mod int_parse;
mod page;
mod scheduler;
mod selector;
mod trace;

pub use config::EnhancerConfig;
pub use dom::NodeId;
pub use enhancements::InitReport;
pub use enhancements::card_animator::entrance_delay;
pub use enhancements::notifier::Severity;
pub use events::Handler;
pub use int_parse::parse_int;
pub use page::{Page, PriceBinding};
pub use scheduler::{PendingTimer, TimerTask};

pub(crate) use dom::Dom;
pub(crate) use events::{EventState, ListenerStore};
pub(crate) use html::parse_html;
pub(crate) use int_parse::IntParser;
pub(crate) use scheduler::{ScheduledTask, SchedulerState};
pub(crate) use selector::{
    SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorStep, parse_selector_groups,
};
pub(crate) use trace::TraceState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    DomMutation(String),
    Timer(String),
    Config(String),
    AlreadyInitialized,
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
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::DomMutation(msg) => write!(f, "dom mutation error: {msg}"),
            Self::Timer(msg) => write!(f, "timer error: {msg}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::AlreadyInitialized => write!(f, "page enhancements are already initialized"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

// Deep markup recurses through the DOM walkers; grow the stack instead of overflowing.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests;
