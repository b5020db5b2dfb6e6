use super::*;

pub(crate) mod booking_form;
pub(crate) mod card_animator;
pub(crate) mod notifier;

/// What page-ready wiring found in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    pub cards: usize,
    pub forms: usize,
    pub price_bindings: usize,
}

pub(crate) fn initialize(page: &mut Page) -> Result<InitReport> {
    if page.initialized {
        return Err(Error::AlreadyInitialized);
    }
    page.initialized = true;

    let cards = card_animator::attach(page)?;
    let (forms, price_bindings) = booking_form::attach(page)?;

    let report = InitReport {
        cards,
        forms,
        price_bindings,
    };
    page.trace.app_line(format!(
        "[app] initialized cards={} forms={} price_bindings={}",
        report.cards, report.forms, report.price_bindings
    ));
    Ok(report)
}
