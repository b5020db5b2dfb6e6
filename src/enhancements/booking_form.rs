use super::*;

/// Wires every booking form. Returns `(forms, forms with a price binding)`.
pub(crate) fn attach(page: &mut Page) -> Result<(usize, usize)> {
    let forms = page.dom.query_selector_all(&page.config.form_selector)?;
    let mut bound = 0;

    for form in forms.iter().copied() {
        if let Some(binding) = bind_price(page, form)? {
            let input = binding.input;
            let index = page.bindings.len();
            page.trace.app_line(format!(
                "[app] price binding form={} base_price={}",
                index,
                describe_amount(binding.base_price)
            ));
            page.bindings.push(binding);
            page.listeners
                .add(input, "input", Handler::PassengerInput { binding: index });
            bound += 1;
        }
        page.listeners.add(form, "submit", Handler::BookingSubmit);
    }

    Ok((forms.len(), bound))
}

// A form gets a binding only when its passenger field, an enclosing price
// section and a price display inside that section all exist.
fn bind_price(page: &Page, form: NodeId) -> Result<Option<PriceBinding>> {
    let Some(input) = page
        .dom
        .query_selector_from(form, &page.config.passenger_input_selector)?
    else {
        return Ok(None);
    };
    let Some(section) = page
        .dom
        .closest(form, &page.config.price_section_selector)?
    else {
        return Ok(None);
    };
    let Some(price) = page
        .dom
        .query_selector_from(section, &page.config.price_selector)?
    else {
        return Ok(None);
    };

    let base_price = read_base_price(
        &page.int_parser,
        &page.dom.text_content(price),
        page.config.currency_symbol,
    );

    Ok(Some(PriceBinding {
        form,
        input,
        price,
        base_price,
        last_total: None,
        recalculations: 0,
    }))
}

/// Drops the first currency symbol and reads the integer prefix of the rest.
pub(crate) fn read_base_price(parser: &IntParser, text: &str, symbol: char) -> Option<i64> {
    parser.parse(&text.replacen(symbol, "", 1))
}

/// Passenger count for a raw field value; blank, unreadable and zero count as one.
pub(crate) fn passenger_count(parser: &IntParser, raw: &str) -> i64 {
    match parser.parse(raw) {
        None | Some(0) => 1,
        Some(count) => count,
    }
}

pub(crate) fn recalculate(page: &mut Page, binding: usize) -> Result<()> {
    let Some(entry) = page.bindings.get(binding) else {
        return Ok(());
    };
    let (input, price, base_price) = (entry.input, entry.price, entry.base_price);

    let raw = page.dom.value(input)?;
    let passengers = passenger_count(&page.int_parser, &raw);
    let total = base_price.and_then(|base| base.checked_mul(passengers));

    if let Some(entry) = page.bindings.get_mut(binding) {
        entry.last_total = total;
        entry.recalculations += 1;
    }
    page.trace.app_line(format!(
        "[app] recalculate form={} passengers={} total={}",
        binding,
        passengers,
        describe_amount(total)
    ));

    page.dom
        .style_set(price, "transform", &page.config.pulse_transform)?;
    page.schedule(TimerTask::SettlePrice { price }, page.config.pulse_ms);
    Ok(())
}

pub(crate) fn settle_price(page: &mut Page, price: NodeId) -> Result<()> {
    page.dom
        .style_set(price, "transform", &page.config.rest_transform)
}

/// Swaps the form's submit control to a spinner and disables it.
pub(crate) fn lock_submit(page: &mut Page, form: NodeId) -> Result<()> {
    let Some(button) = page
        .dom
        .query_selector_from(form, &page.config.submit_selector)?
    else {
        return Ok(());
    };

    page.dom
        .set_inner_html(button, r#"<i class="fas fa-spinner fa-spin me-2"></i>"#)?;
    page.dom
        .create_text(button, page.config.loading_label.clone());
    page.dom.set_disabled(button, true)?;
    page.trace.app_line("[app] submit locked".into());
    Ok(())
}

fn describe_amount(amount: Option<i64>) -> String {
    amount.map_or_else(|| "NaN".into(), |value| value.to_string())
}
