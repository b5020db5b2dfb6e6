use super::*;

pub(crate) fn attach(page: &mut Page) -> Result<usize> {
    let cards = page.dom.query_selector_all(&page.config.card_selector)?;
    page.trace
        .app_line(format!("[app] found {} flight cards", cards.len()));

    for (index, card) in cards.iter().copied().enumerate() {
        let delay = entrance_delay(index, page.config.stagger_step_ms);
        page.dom.style_set(card, "animation-delay", &delay)?;
        page.listeners.add(card, "mouseenter", Handler::CardRaise);
        page.listeners.add(card, "mouseleave", Handler::CardSettle);
    }

    Ok(cards.len())
}

pub(crate) fn raise(page: &mut Page, card: NodeId) -> Result<()> {
    page.dom
        .style_set(card, "transform", &page.config.raised_transform)
}

pub(crate) fn settle(page: &mut Page, card: NodeId) -> Result<()> {
    page.dom
        .style_set(card, "transform", &page.config.neutral_transform)
}

/// CSS `animation-delay` for the card at `index` in document order.
///
/// ```
/// use aeroreserva_ui::entrance_delay;
///
/// assert_eq!(entrance_delay(0, 100), "0s");
/// assert_eq!(entrance_delay(3, 100), "0.3s");
/// assert_eq!(entrance_delay(12, 100), "1.2s");
/// ```
pub fn entrance_delay(index: usize, step_ms: u64) -> String {
    let total_ms = u64::try_from(index)
        .unwrap_or(u64::MAX)
        .saturating_mul(step_ms);
    format_seconds(total_ms)
}

// Millisecond count as seconds, with no trailing zeros in the fraction.
fn format_seconds(ms: u64) -> String {
    let whole = ms / 1000;
    let fraction = ms % 1000;
    if fraction == 0 {
        return format!("{whole}s");
    }
    let mut digits = format!("{fraction:03}");
    while digits.ends_with('0') {
        digits.pop();
    }
    format!("{whole}.{digits}s")
}
