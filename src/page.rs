use super::*;

use enhancements::{booking_form, card_animator, notifier};

/// Per-form price recalculation state, captured when the page initializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBinding {
    pub form: NodeId,
    pub input: NodeId,
    pub price: NodeId,
    /// Per-passenger price read from the display; `None` when it is not a number.
    pub base_price: Option<i64>,
    /// Total from the latest passenger input. It is computed but not shown anywhere.
    pub last_total: Option<i64>,
    pub recalculations: usize,
}

/// A loaded booking page: DOM, listeners, clock and the enhancement state.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: SchedulerState,
    pub(crate) trace: TraceState,
    pub(crate) config: EnhancerConfig,
    pub(crate) int_parser: IntParser,
    pub(crate) bindings: Vec<PriceBinding>,
    pub(crate) submissions: HashMap<NodeId, usize>,
    pub(crate) initialized: bool,
}

impl Page {
    /// Parses `html` without wiring any enhancement.
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, EnhancerConfig::default())
    }

    pub fn from_html_with_config(html: &str, config: EnhancerConfig) -> Result<Self> {
        config.validate()?;
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: SchedulerState::default(),
            trace: TraceState::default(),
            config,
            int_parser: IntParser::new()?,
            bindings: Vec::new(),
            submissions: HashMap::new(),
            initialized: false,
        };

        // Dismiss controls work through a delegated document listener, like the
        // alert data API the banners are styled for.
        let root = page.dom.root;
        page.listeners.add(root, "click", Handler::DismissAlert);

        Ok(page)
    }

    /// Parses `html` and runs [`Page::initialize`].
    pub fn load(html: &str) -> Result<Self> {
        Self::load_with_config(html, EnhancerConfig::default())
    }

    pub fn load_with_config(html: &str, config: EnhancerConfig) -> Result<Self> {
        let mut page = Self::from_html_with_config(html, config)?;
        page.initialize()?;
        Ok(page)
    }

    /// Page-ready entry point: wires flight cards and booking forms present
    /// right now. Elements added later are not picked up.
    ///
    /// Fails with [`Error::AlreadyInitialized`] on a second call.
    pub fn initialize(&mut self) -> Result<InitReport> {
        enhancements::initialize(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    /// Shows a toast banner that removes itself after the configured lifetime.
    pub fn notify(&mut self, message: &str, severity: impl Into<Severity>) -> Result<NodeId> {
        notifier::show(self, message, severity.into())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_app(&mut self, enabled: bool) {
        self.trace.app = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_log_limit(max_entries)
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Config(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.scheduler.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, "mouseenter")?;
        Ok(())
    }

    pub fn unhover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, "mouseleave")?;
        Ok(())
    }

    /// Replaces the control's value and fires `input`, like a user edit.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    /// Clicks an element. Disabled controls ignore the click; submit
    /// controls then submit their form.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        self.dispatch_event(target, "click")?;

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.resolve_form_for_submit(target) {
                self.submit_form(form)?;
            }
        }

        Ok(())
    }

    /// Submits the form matching `selector`, or the form owning that element.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if let Some(form) = self.resolve_form_for_submit(target) {
            self.submit_form(form)?;
        }
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending_timers()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        self.trace.timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_timer_queue(Some(target_ms), false)?;
        self.trace.timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    /// Runs every queued timer, moving the clock to each one's due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace.timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.scheduler.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.scheduler.next_task_index(None) else {
            self.trace.timer_line("[timer] run_next none".into());
            return Ok(false);
        };

        let task = self.scheduler.task_queue.remove(next_idx);
        if task.due_at > self.scheduler.now_ms {
            self.scheduler.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        self.trace.timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.scheduler.now_ms, ran
        ));
        Ok(ran)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn inner_html(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.inner_html(target)
    }

    pub fn is_disabled(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.disabled(target))
    }

    pub fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    /// Whether `node` is still part of the document.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.dom.is_connected(node)
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn price_bindings(&self) -> &[PriceBinding] {
        &self.bindings
    }

    /// Latest computed total for the booking form matching `selector`.
    pub fn last_total(&self, selector: &str) -> Result<Option<i64>> {
        let form = self.select_one(selector)?;
        Ok(self
            .bindings
            .iter()
            .find(|binding| binding.form == form)
            .and_then(|binding| binding.last_total))
    }

    /// How many times the form matching `selector` went out.
    pub fn submission_count(&self, selector: &str) -> Result<usize> {
        let form = self.select_one(selector)?;
        Ok(self.submissions.get(&form).copied().unwrap_or(0))
    }

    /// Handlers attached to the element matching `selector` for `event`.
    pub fn handlers(&self, selector: &str, event: &str) -> Result<Vec<Handler>> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.get(target, event))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        if actual != expected {
            return Err(self.assertion_failed(
                selector,
                target,
                &format!("{property}: {expected}"),
                format!("{property}: {actual}"),
            ));
        }
        Ok(())
    }

    pub fn assert_disabled(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.disabled(target);
        if actual != expected {
            return Err(self.assertion_failed(
                selector,
                target,
                &format!("disabled={expected}"),
                format!("disabled={actual}"),
            ));
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let matched = self.dom.query_selector_all(selector)?;
        if matched.len() != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{expected} match(es)"),
                actual: format!("{} match(es)", matched.len()),
                dom_snippet: self.node_snippet(self.dom.body()),
            });
        }
        Ok(())
    }

    fn assertion_failed(
        &self,
        selector: &str,
        target: NodeId,
        expected: &str,
        actual: String,
    ) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
            dom_snippet: self.node_snippet(target),
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn resolve_form_for_submit(&self, target: NodeId) -> Option<NodeId> {
        if self
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            return Some(target);
        }
        self.dom.find_ancestor_by_tag(target, "form")
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        self.dispatch_event(form, "submit")?;
        Ok(())
    }

    pub(crate) fn schedule(&mut self, task: TimerTask, delay_ms: i64) -> i64 {
        let scheduled = self.scheduler.schedule_timeout(task, delay_ms);
        self.trace.timer_line(format!(
            "[timer] schedule timeout id={} due_at={} delay_ms={} task={:?}",
            scheduled.id,
            scheduled.due_at,
            delay_ms.max(0),
            scheduled.task
        ));
        scheduled.id
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.scheduler.next_task_index(due_limit) {
            steps += 1;
            if steps > self.scheduler.timer_step_limit {
                return Err(self.scheduler.step_limit_error(steps, due_limit));
            }
            let task = self.scheduler.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace.timer_line(format!(
            "[timer] run id={} due_at={} now_ms={} task={:?}",
            task.id, task.due_at, self.scheduler.now_ms, task.task
        ));

        match task.task {
            TimerTask::SettlePrice { price } => booking_form::settle_price(self, price),
            TimerTask::DismissBanner { banner } => notifier::auto_dismiss(self, banner),
        }
    }

    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        // The propagation path is fixed before any listener runs.
        let mut path = Vec::new();
        if event.bubbles {
            let mut cursor = self.dom.parent(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = self.dom.parent(node);
            }
        }

        self.invoke_listeners(target, &event)?;
        for node in path {
            event.current_target = node;
            self.invoke_listeners(node, &event)?;
        }

        // Nothing cancels submission, so every submit a form receives counts as sent.
        if event.event_type == "submit" && self.dom.tag_name(target) == Some("form") {
            *self.submissions.entry(target).or_insert(0) += 1;
        }

        let target_label = self.trace_node_label(event.target);
        self.trace.event_line(format!(
            "[event] done {} target={} bubbles={}",
            event.event_type, target_label, event.bubbles
        ));
        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &EventState) -> Result<()> {
        let handlers = self.listeners.get(node_id, &event.event_type);
        for handler in handlers {
            if self.trace.enabled {
                let target_label = self.trace_node_label(event.target);
                let current_label = self.trace_node_label(event.current_target);
                self.trace.event_line(format!(
                    "[event] {} target={} current={} handler={:?}",
                    event.event_type, target_label, current_label, handler
                ));
            }
            self.execute_handler(handler, event)?;
        }
        Ok(())
    }

    fn execute_handler(&mut self, handler: Handler, event: &EventState) -> Result<()> {
        match handler {
            Handler::CardRaise => card_animator::raise(self, event.current_target),
            Handler::CardSettle => card_animator::settle(self, event.current_target),
            Handler::PassengerInput { binding } => booking_form::recalculate(self, binding),
            Handler::BookingSubmit => booking_form::lock_submit(self, event.current_target),
            Handler::DismissAlert => notifier::dismiss_from(self, event.target),
        }
    }

    fn trace_node_label(&self, node: NodeId) -> String {
        if node == self.dom.root {
            return "document".into();
        }
        let Some(element) = self.dom.element(node) else {
            return "#text".into();
        };
        let mut label = element.tag_name.clone();
        if let Some(id) = element.attrs.get("id").filter(|id| !id.is_empty()) {
            label.push('#');
            label.push_str(id);
        } else if let Some(class) = element.attrs.get("class") {
            if let Some(first) = class.split_whitespace().next() {
                label.push('.');
                label.push_str(first);
            }
        }
        label
    }
}

fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    if element.tag_name.eq_ignore_ascii_case("button") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }

    if element.tag_name.eq_ignore_ascii_case("input") {
        return element
            .attrs
            .get("type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(false);
    }

    false
}
