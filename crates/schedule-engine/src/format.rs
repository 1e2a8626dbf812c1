//! Human-readable rendering of slots in the user's local zone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::confirmation::latest_start;
use crate::event::Event;
use crate::interval::TimeInterval;
use crate::policy::WindowFitPolicy;

/// `HH:MM` in `tz`.
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// `HH:MM-HH:MM` in `tz`.
pub fn format_slot(slot: &TimeInterval, tz: Tz) -> String {
    format!("{}-{}", format_time(slot.start(), tz), format_time(slot.end(), tz))
}

/// `M/D(Ddd) HH:MM-HH:MM` in `tz`, dated by the slot's start.
pub fn format_slot_with_date(slot: &TimeInterval, tz: Tz) -> String {
    let date = slot.start().with_timezone(&tz).format("%-m/%-d(%a)");
    format!("{} {}", date, format_slot(slot, tz))
}

/// The candidate windows as text to paste into a reply to the company.
///
/// One line per local date, `・M/D(Ddd) ` followed by the windows of that day
/// joined with `、`. Each window shows the range of possible *start* times:
///
/// - window as long as the interview: `HH:MM`
/// - longer window: `HH:MM〜HH:MM`, ending at the latest start
/// - shorter window: `HH:MM〜HH:MM`, the window itself
pub fn format_candidate_summary(event: &Event, tz: Tz) -> String {
    let mut days: Vec<(NaiveDate, Vec<String>)> = Vec::new();

    let mut windows: Vec<&TimeInterval> = event.candidate_slots.iter().map(|w| w.interval()).collect();
    windows.sort_by_key(|w| (w.start(), w.end()));

    for window in windows {
        let date = window.start().with_timezone(&tz).date_naive();
        let start = format_time(window.start(), tz);
        let text = match latest_start(window, event.interview_duration, WindowFitPolicy::Strict) {
            Some(latest) if latest == window.start() => start,
            Some(latest) => format!("{}〜{}", start, format_time(latest, tz)),
            None => format!("{}〜{}", start, format_time(window.end(), tz)),
        };

        match days.last_mut() {
            Some((day, entries)) if *day == date => entries.push(text),
            _ => days.push((date, vec![text])),
        }
    }

    days.into_iter()
        .map(|(date, entries)| format!("・{} {}", date.format("%-m/%-d(%a)"), entries.join("、")))
        .collect::<Vec<_>>()
        .join("\n")
}
