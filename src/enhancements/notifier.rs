use super::*;

/// Banner color scheme. Tags match exactly, so `"SUCCESS"` or `" danger"`
/// fall back to [`Severity::Info`] like any other unknown tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Danger,
    #[default]
    Info,
    Warning,
}

impl Severity {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => Self::Success,
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    /// Suffix of the banner's `alert-*` class.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Icon name, used as `fa-{icon}`.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Danger => "exclamation-triangle",
            Self::Info => "info-circle",
            Self::Warning => "exclamation-circle",
        }
    }
}

impl From<&str> for Severity {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl From<Option<&str>> for Severity {
    fn from(tag: Option<&str>) -> Self {
        tag.map(Self::from_tag).unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub(crate) fn show(page: &mut Page, message: &str, severity: Severity) -> Result<NodeId> {
    let banner = page.dom.create_detached_element("div");
    page.dom.set_attr(
        banner,
        "class",
        &format!(
            "alert alert-{} alert-dismissible fade show position-fixed",
            severity.tag()
        ),
    )?;
    page.dom
        .set_style_text(banner, &page.config.notification_style)?;

    page.dom.set_inner_html(
        banner,
        &format!(r#"<i class="fas fa-{} me-2"></i>"#, severity.icon()),
    )?;
    // The message is text, never markup.
    page.dom.create_text(banner, message.to_string());
    page.dom.create_element(
        banner,
        "button".into(),
        HashMap::from([
            ("type".to_string(), "button".to_string()),
            ("class".to_string(), "btn-close".to_string()),
            ("data-bs-dismiss".to_string(), "alert".to_string()),
        ]),
    );

    let body = page.dom.body();
    page.dom.append_child(body, banner)?;

    let timer = page.schedule(
        TimerTask::DismissBanner { banner },
        page.config.notification_ttl_ms,
    );
    page.trace.app_line(format!(
        "[app] notify severity={} timer={}",
        severity.tag(),
        timer
    ));
    Ok(banner)
}

pub(crate) fn auto_dismiss(page: &mut Page, banner: NodeId) -> Result<()> {
    if page.dom.parent(banner).is_none() {
        page.trace
            .app_line("[app] banner already dismissed".into());
        return Ok(());
    }
    page.dom.remove_node(banner)
}

/// Delegated click handling for `data-bs-dismiss="alert"` controls.
pub(crate) fn dismiss_from(page: &mut Page, target: NodeId) -> Result<()> {
    let Some(control) = page
        .dom
        .closest(target, r#"[data-bs-dismiss="alert"]"#)?
    else {
        return Ok(());
    };
    let Some(alert) = page.dom.closest(control, ".alert")? else {
        return Ok(());
    };
    page.dom.remove_node(alert)
}
