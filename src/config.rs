use super::*;

/// Selectors, styles and timings the page enhancements work with.
///
/// The defaults match the markup and stylesheet the AeroReserva server
/// renders; override fields to drive other markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancerConfig {
    pub card_selector: String,
    pub stagger_step_ms: u64,
    pub raised_transform: String,
    pub neutral_transform: String,

    pub form_selector: String,
    pub passenger_input_selector: String,
    pub price_section_selector: String,
    pub price_selector: String,
    pub currency_symbol: char,
    pub pulse_transform: String,
    pub rest_transform: String,
    pub pulse_ms: i64,
    pub submit_selector: String,
    pub loading_label: String,

    pub notification_ttl_ms: i64,
    pub notification_style: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            card_selector: ".flight-card".into(),
            stagger_step_ms: 100,
            raised_transform: "translateY(-8px)".into(),
            neutral_transform: "translateY(0)".into(),

            form_selector: ".booking-form".into(),
            passenger_input_selector: r#"input[name="num_pasajeros"]"#.into(),
            price_section_selector: ".price-section".into(),
            price_selector: ".price".into(),
            currency_symbol: '$',
            pulse_transform: "scale(1.05)".into(),
            rest_transform: "scale(1)".into(),
            pulse_ms: 150,
            submit_selector: r#"button[type="submit"]"#.into(),
            loading_label: "Procesando...".into(),

            notification_ttl_ms: 5000,
            notification_style: "top: 90px; right: 20px; z-index: 1060; min-width: 300px;".into(),
        }
    }
}

impl EnhancerConfig {
    /// Checks every selector parses and every delay is usable.
    pub fn validate(&self) -> Result<()> {
        for (field, selector) in [
            ("card_selector", &self.card_selector),
            ("form_selector", &self.form_selector),
            ("passenger_input_selector", &self.passenger_input_selector),
            ("price_section_selector", &self.price_section_selector),
            ("price_selector", &self.price_selector),
            ("submit_selector", &self.submit_selector),
        ] {
            parse_selector_groups(selector)
                .map_err(|err| Error::Config(format!("{field}: {err}")))?;
        }
        if self.pulse_ms < 0 {
            return Err(Error::Config("pulse_ms must not be negative".into()));
        }
        if self.notification_ttl_ms <= 0 {
            return Err(Error::Config(
                "notification_ttl_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
