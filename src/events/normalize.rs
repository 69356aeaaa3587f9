use super::types::{ASR, Event, RawEvent};

/// Collapse every run of whitespace (newlines included) into a single space
/// and trim both ends.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round seconds to millisecond precision
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Turn raw events into the canonical event list.
///
/// Both the event builder and the chunker go through this function, so the
/// two stages always agree on which events survive and in which order:
/// - events whose cleaned text is empty are dropped
/// - times are resolved with [`RawEvent::resolve_times`] and rounded to ms
/// - the result is stable-sorted by `(t_start, t_end)`
///
/// Event ids are left unset; see [`assign_event_ids`].
pub fn normalize<I>(raw: I) -> Vec<Event>
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut events: Vec<Event> = raw
        .into_iter()
        .filter_map(|raw| {
            let text = clean_text(raw.text.as_deref().unwrap_or(""));
            if text.is_empty() {
                return None;
            }

            let (t_start, t_end) = raw.resolve_times();
            let kind = raw
                .kind
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| ASR.to_string());
            let source = raw
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| kind.clone());

            Some(Event {
                event_id: None,
                kind,
                t_start: round_ms(t_start),
                t_end: round_ms(t_end),
                text,
                source,
            })
        })
        .collect();

    // sort_by is stable: equal timestamps keep their input order
    events.sort_by(|a, b| {
        a.t_start
            .total_cmp(&b.t_start)
            .then_with(|| a.t_end.total_cmp(&b.t_end))
    });

    events
}

/// Number events by their position in the list
pub fn assign_event_ids(events: &mut [Event]) {
    for (idx, event) in events.iter_mut().enumerate() {
        event.event_id = Some(idx);
    }
}
