use super::*;

fn first(dom: &Dom, selector: &str) -> NodeId {
    dom.query_selector(selector)
        .expect("selector should parse")
        .expect("selector should match")
}

#[test]
fn parse_html_skips_declarations_and_decodes_entities() -> Result<()> {
    let dom = parse_html(
        "<!DOCTYPE html><!-- header --><div id='a'><p class='x y'>Hi &amp; bye</p><br><img src=x></div>",
    )?;
    let div = dom.by_id("a").expect("div should be indexed");
    assert_eq!(
        dom.dump_node(div),
        r#"<div id="a"><p class="x y">Hi &amp; bye</p><br><img src="x"></div>"#
    );
    assert_eq!(dom.text_content(div), "Hi & bye");
    Ok(())
}

#[test]
fn parse_html_keeps_script_bodies_as_raw_text() -> Result<()> {
    let dom = parse_html("<script>if (a < b) { go(); }</script><p>ok</p>")?;
    let script = first(&dom, "script");
    assert_eq!(dom.text_content(script), "if (a < b) { go(); }");
    assert_eq!(dom.query_selector_all("p")?.len(), 1);
    Ok(())
}

#[test]
fn parse_html_ignores_stray_end_tags() -> Result<()> {
    let dom = parse_html("<div><span>a</em>b</span>c</div>")?;
    assert_eq!(dom.text_content(first(&dom, "span")), "ab");
    assert_eq!(dom.text_content(first(&dom, "div")), "abc");
    Ok(())
}

#[test]
fn parse_html_void_elements_take_no_children() -> Result<()> {
    let dom = parse_html(r#"<form><input name="n" value="2"><button>Go</button></form>"#)?;
    let input = first(&dom, "input");
    assert_eq!(dom.value(input)?, "2");
    assert_eq!(dom.query_selector_all("form > button")?.len(), 1);
    assert_eq!(dom.query_selector_all("input button")?.len(), 0);
    Ok(())
}

#[test]
fn parse_html_text_with_bare_angle_bracket_stays_text() -> Result<()> {
    let dom = parse_html("<p>1 < 2</p>")?;
    assert_eq!(dom.text_content(first(&dom, "p")), "1 < 2");
    Ok(())
}

#[test]
fn parse_html_decodes_numeric_references() -> Result<()> {
    let dom = parse_html(
        r#"<span id="usd">&#36;250</span><span id="eur" title="&#x20AC;80">&#8364;80 &#X41;</span>"#,
    )?;
    let usd = dom.by_id("usd").expect("span should be indexed");
    let eur = dom.by_id("eur").expect("span should be indexed");
    assert_eq!(dom.text_content(usd), "$250");
    assert_eq!(dom.text_content(eur), "€80 A");
    assert_eq!(dom.attr(eur, "title").as_deref(), Some("€80"));
    Ok(())
}

#[test]
fn parse_html_leaves_malformed_references_alone() -> Result<()> {
    let dom = parse_html("<p>&#; &#xZZ; &#99999999; &bogus; AT&T &amp;lt;</p>")?;
    assert_eq!(
        dom.text_content(first(&dom, "p")),
        "&#; &#xZZ; &#99999999; &bogus; AT&T &lt;"
    );
    Ok(())
}

#[test]
fn parse_html_textarea_content_is_markup() -> Result<()> {
    let dom = parse_html("<textarea id='notes'><b>Ventana</b></textarea>")?;
    assert_eq!(dom.query_selector_all("textarea > b")?.len(), 1);
    assert_eq!(dom.text_content(first(&dom, "#notes")), "Ventana");
    Ok(())
}

#[test]
fn parse_html_rejects_unclosed_comment() {
    let err = parse_html("<div><!-- never closed").expect_err("comment should fail");
    match err {
        Error::HtmlParse(msg) => assert!(msg.contains("comment")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn selector_groups_parse_combinators() -> Result<()> {
    let groups = parse_selector_groups("section.price-section > form .price, #total")?;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0][0].step.tag.as_deref(), Some("section"));
    assert_eq!(groups[0][0].step.classes, vec!["price-section".to_string()]);
    assert_eq!(groups[0][1].combinator, Some(SelectorCombinator::Child));
    assert_eq!(groups[0][2].combinator, Some(SelectorCombinator::Descendant));
    assert_eq!(groups[1][0].step.id_only(), Some("total"));
    Ok(())
}

#[test]
fn selector_attribute_values_drop_quotes() -> Result<()> {
    let groups = parse_selector_groups(r#"input[name="num_pasajeros"][required]"#)?;
    assert_eq!(
        groups[0][0].step.attrs,
        vec![
            SelectorAttrCondition::Eq {
                key: "name".into(),
                value: "num_pasajeros".into(),
            },
            SelectorAttrCondition::Exists {
                key: "required".into(),
            },
        ]
    );
    Ok(())
}

#[test]
fn selector_rejects_malformed_input() {
    for selector in [
        "", "div >", "> p", "a,,b", "[name", "div]", "#", "p*", "*p", "**", "#a#b",
    ] {
        assert!(
            matches!(
                parse_selector_groups(selector),
                Err(Error::UnsupportedSelector(_))
            ),
            "{selector:?} should be rejected"
        );
    }
}

#[test]
fn scoped_queries_and_closest_follow_tree_shape() -> Result<()> {
    let dom = parse_html(
        r#"
        <section class="price-section">
          <span class="price">$10</span>
          <form class="booking-form">
            <input name="num_pasajeros">
          </form>
        </section>
        <span class="price">$99</span>
        "#,
    )?;
    let section = first(&dom, ".price-section");
    let form = first(&dom, ".booking-form");
    let input = first(&dom, "input");

    assert_eq!(dom.query_selector_all(".price")?.len(), 2);
    assert_eq!(dom.query_selector_all_from(section, ".price")?.len(), 1);
    assert_eq!(dom.query_selector_from(form, ".price")?, None);
    assert_eq!(dom.closest(input, ".price-section")?, Some(section));
    assert_eq!(dom.closest(form, "form")?, Some(form));
    assert_eq!(dom.find_ancestor_by_tag(input, "form"), Some(form));
    assert_eq!(
        dom.query_selector("section input[name=num_pasajeros]")?,
        Some(input)
    );
    assert_eq!(dom.query_selector("section > input")?, None);
    Ok(())
}

#[test]
fn style_declarations_are_merged_in_order() -> Result<()> {
    let mut dom = parse_html("<div class='flight-card' style='color: red'></div>")?;
    let card = first(&dom, ".flight-card");

    dom.style_set(card, "animationDelay", "0.1s")?;
    dom.style_set(card, "transform", "translateY(-8px)")?;
    assert_eq!(
        dom.attr(card, "style").as_deref(),
        Some("color: red; animation-delay: 0.1s; transform: translateY(-8px);")
    );
    assert_eq!(dom.style_get(card, "animation-delay")?, "0.1s");

    dom.style_set(card, "color", "")?;
    dom.style_set(card, "transform", "translateY(0)")?;
    assert_eq!(
        dom.attr(card, "style").as_deref(),
        Some("animation-delay: 0.1s; transform: translateY(0);")
    );
    assert_eq!(dom.style_get(card, "z-index")?, "");
    Ok(())
}

#[test]
fn css_text_replaces_inline_style() -> Result<()> {
    let mut dom = parse_html("<div style='color: red'></div>")?;
    let div = first(&dom, "div");
    dom.set_style_text(div, "top: 90px;right:20px; z-index: 1060")?;
    assert_eq!(
        dom.attr(div, "style").as_deref(),
        Some("top: 90px; right: 20px; z-index: 1060;")
    );
    dom.set_style_text(div, "")?;
    assert_eq!(dom.attr(div, "style"), None);
    Ok(())
}

#[test]
fn duplicate_ids_resolve_to_the_first_element() -> Result<()> {
    let mut dom = parse_html(r#"<p id="a">first</p><p id="a">second</p>"#)?;
    let lookup = |dom: &Dom| dom.by_id("a").map(|node| dom.text_content(node));
    assert_eq!(lookup(&dom).as_deref(), Some("first"));

    // Unrelated mutations rebuild the index without changing the winner.
    let banner = dom.create_detached_element("div");
    let body = dom.body();
    dom.append_child(body, banner)?;
    assert_eq!(lookup(&dom).as_deref(), Some("first"));

    dom.set_attr(banner, "id", "a")?;
    assert_eq!(lookup(&dom).as_deref(), Some("first"));

    let paragraphs = dom.query_selector_all("p")?;
    dom.remove_attr(paragraphs[0], "id")?;
    assert_eq!(lookup(&dom).as_deref(), Some("second"));
    Ok(())
}

#[test]
fn inner_html_replacement_reindexes_ids() -> Result<()> {
    let mut dom = parse_html("<button id='go'><b id='old'>Book</b></button>")?;
    let button = first(&dom, "#go");
    dom.set_inner_html(button, "<i id='spinner' class='fa-spin'></i>")?;
    dom.create_text(button, "Processing...".into());

    assert_eq!(dom.by_id("old"), None);
    assert!(dom.by_id("spinner").is_some());
    assert_eq!(
        dom.inner_html(button)?,
        r#"<i class="fa-spin" id="spinner"></i>Processing..."#
    );
    assert_eq!(dom.text_content(button), "Processing...");
    Ok(())
}

#[test]
fn disabled_follows_the_attribute() -> Result<()> {
    let mut dom = parse_html("<button disabled>a</button><button>b</button>")?;
    let buttons = dom.query_selector_all("button")?;
    assert!(dom.disabled(buttons[0]));
    assert!(!dom.disabled(buttons[1]));

    dom.set_disabled(buttons[1], true)?;
    assert!(dom.disabled(buttons[1]));
    assert_eq!(dom.attr(buttons[1], "disabled").as_deref(), Some(""));

    dom.set_disabled(buttons[0], false)?;
    assert!(!dom.disabled(buttons[0]));
    assert_eq!(dom.query_selector_all("button[disabled]")?.len(), 1);
    Ok(())
}

#[test]
fn tree_edits_reject_cycles_and_root_removal() -> Result<()> {
    let mut dom = parse_html("<div id='outer'><div id='inner'></div></div>")?;
    let outer = first(&dom, "#outer");
    let inner = first(&dom, "#inner");

    assert!(matches!(
        dom.append_child(inner, outer),
        Err(Error::DomMutation(_))
    ));
    assert!(matches!(dom.remove_node(dom.root), Err(Error::DomMutation(_))));

    dom.remove_node(inner)?;
    assert!(!dom.is_connected(inner));
    assert_eq!(dom.by_id("inner"), None);
    // Removing an already detached node is a no-op.
    dom.remove_node(inner)?;

    let detached = dom.create_detached_element("DIV");
    assert_eq!(dom.tag_name(detached), Some("div"));
    assert!(!dom.is_connected(detached));
    dom.append_child(outer, detached)?;
    assert!(dom.is_connected(detached));
    Ok(())
}

#[test]
fn body_falls_back_to_document() -> Result<()> {
    let dom = parse_html("<p>fragment</p>")?;
    assert_eq!(dom.body(), dom.root);

    let dom = parse_html("<html><body><p>page</p></body></html>")?;
    assert_eq!(dom.tag_name(dom.body()), Some("body"));
    Ok(())
}

#[test]
fn int_parser_reads_integer_prefixes() -> Result<()> {
    let parser = IntParser::new()?;
    assert_eq!(parser.parse("42"), Some(42));
    assert_eq!(parser.parse("   42px"), Some(42));
    assert_eq!(parser.parse("\t\n12"), Some(12));
    assert_eq!(parser.parse("+7"), Some(7));
    assert_eq!(parser.parse("-15 seats"), Some(-15));
    assert_eq!(parser.parse("0x1F"), Some(31));
    assert_eq!(parser.parse("1e3"), Some(1));
    assert_eq!(parser.parse("3.99"), Some(3));
    assert_eq!(parser.parse(".5"), None);
    assert_eq!(parser.parse("- 4"), None);
    assert_eq!(parser.parse("abc"), None);
    assert_eq!(parser.parse("9223372036854775808"), None);
    Ok(())
}

#[test]
fn scheduler_orders_by_due_time_then_insertion() {
    let mut scheduler = SchedulerState::default();
    let price = NodeId(1);
    let banner = NodeId(2);

    let late = scheduler.schedule_timeout(TimerTask::DismissBanner { banner }, 50);
    let first_due = scheduler.schedule_timeout(TimerTask::SettlePrice { price }, 10);
    let second_due = scheduler.schedule_timeout(TimerTask::SettlePrice { price }, 10);
    let immediate = scheduler.schedule_timeout(TimerTask::SettlePrice { price }, -5);
    assert_eq!(immediate.due_at, 0);

    let ids = scheduler
        .pending_timers()
        .into_iter()
        .map(|timer| timer.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![immediate.id, first_due.id, second_due.id, late.id]);

    assert_eq!(scheduler.next_task_index(Some(-1)), None);
    let next = scheduler
        .next_task_index(Some(10))
        .expect("a timer should be due");
    assert_eq!(scheduler.task_queue[next].id, immediate.id);
}

#[test]
fn scheduler_step_limit_error_describes_queue() {
    let mut scheduler = SchedulerState::default();
    scheduler.schedule_timeout(TimerTask::SettlePrice { price: NodeId(3) }, 150);
    match scheduler.step_limit_error(10_001, Some(200)) {
        Error::Timer(msg) => {
            assert!(msg.contains("limit=10000"));
            assert!(msg.contains("due_limit=200"));
            assert!(msg.contains("pending_tasks=1"));
            assert!(msg.contains("SettlePrice"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn trace_filters_categories_and_bounds_buffer() -> Result<()> {
    let mut trace = TraceState {
        to_stderr: false,
        ..TraceState::default()
    };
    trace.app_line("[app] ignored while disabled".into());
    assert!(trace.logs.is_empty());

    trace.enabled = true;
    trace.timers = false;
    trace.timer_line("[timer] dropped".into());
    trace.event_line("[event] one".into());
    trace.app_line("[app] two".into());
    trace.app_line("[app] three".into());
    assert_eq!(trace.logs.len(), 3);

    trace.set_log_limit(2)?;
    assert_eq!(trace.logs, vec!["[app] two", "[app] three"]);
    trace.event_line("[event] four".into());
    assert_eq!(trace.logs, vec!["[app] three", "[event] four"]);

    assert!(matches!(trace.set_log_limit(0), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn listener_store_keeps_registration_order() {
    let mut listeners = ListenerStore::default();
    let form = NodeId(4);
    listeners.add(form, "submit", Handler::BookingSubmit);
    listeners.add(form, "submit", Handler::DismissAlert);
    listeners.add(form, "input", Handler::PassengerInput { binding: 0 });

    assert_eq!(
        listeners.get(form, "submit"),
        vec![Handler::BookingSubmit, Handler::DismissAlert]
    );
    assert!(listeners.get(form, "click").is_empty());
    assert!(listeners.get(NodeId(5), "submit").is_empty());
    assert_eq!(listeners.len(), 3);
}

#[test]
fn hover_and_focus_events_do_not_bubble() {
    for event in ["mouseenter", "mouseleave", "focus", "blur", "load", "scroll"] {
        assert!(!EventState::new(event, NodeId(1)).bubbles, "{event}");
    }
    for event in ["click", "input", "submit"] {
        assert!(EventState::new(event, NodeId(1)).bubbles, "{event}");
    }
}

#[test]
fn default_config_is_valid() -> Result<()> {
    EnhancerConfig::default().validate()
}

#[test]
fn config_validation_names_the_bad_field() {
    let config = EnhancerConfig {
        card_selector: "div >".into(),
        ..EnhancerConfig::default()
    };
    match config.validate() {
        Err(Error::Config(msg)) => assert!(msg.starts_with("card_selector:"), "{msg}"),
        other => panic!("unexpected result: {other:?}"),
    }

    let config = EnhancerConfig {
        notification_ttl_ms: 0,
        ..EnhancerConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::Config(_))));

    let config = EnhancerConfig {
        pulse_ms: -1,
        ..EnhancerConfig::default()
    };
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn truncate_chars_marks_cut_output() {
    assert_eq!(truncate_chars("abcdef", 3), "abc...");
    assert_eq!(truncate_chars("abc", 3), "abc");
    assert_eq!(truncate_chars("añb", 2), "añ...");
}

#[test]
fn error_display_includes_context() {
    let err = Error::AssertionFailed {
        selector: ".price".into(),
        expected: "transform: scale(1)".into(),
        actual: "transform: scale(1.05)".into(),
        dom_snippet: "<span class=\"price\">$250</span>".into(),
    };
    assert_eq!(
        err.to_string(),
        "assertion failed for .price: expected transform: scale(1), actual transform: scale(1.05), snippet <span class=\"price\">$250</span>"
    );
    assert_eq!(
        Error::AlreadyInitialized.to_string(),
        "page enhancements are already initialized"
    );
}
