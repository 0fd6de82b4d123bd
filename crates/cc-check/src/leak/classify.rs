//! Stage 3: inspects the fully reduced event stream and decides
//! whether it describes a leak. Alongside the verdict, returns the index
//! of the event that triggered it, when one is identifiable — a guarded
//! exit's `return`/`break`/`continue`, or the offending reallocation —
//! so the caller can report the diagnostic there instead of always on
//! the variable's declaration.

use super::events::Event;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    NoFinding,
    Bail,
    Leak,
}

fn contains(events: &[Event], target: Event) -> bool {
    events.contains(&target)
}

/// Finds the first `Alloc ; guard tail` window and returns the index of
/// `tail` — the guard's exit statement is where the leak actually fires.
fn find_alloc_then(events: &[Event], guard: Event, tail: Event) -> Option<usize> {
    events.windows(4).enumerate().find_map(|(i, w)| {
        (matches!(w[0], Event::Alloc(_)) && w[1] == Event::Semi && w[2] == guard && w[3] == tail).then_some(i + 3)
    })
}

pub fn classify(events: &[Event], show_all: bool) -> (Classification, Option<usize>) {
    if !events.iter().any(|e| matches!(e, Event::Alloc(_))) {
        return (Classification::NoFinding, None);
    }
    if contains(events, Event::Goto) {
        return (Classification::Bail, None);
    }
    if let Some(i) = events
        .windows(3)
        .position(|w| w[0] == Event::Loop && matches!(w[1], Event::Alloc(_)) && w[2] == Event::Semi)
    {
        return (Classification::Leak, Some(i + 1));
    }
    for tail in [Event::Continue, Event::Break, Event::Return] {
        if let Some(i) = find_alloc_then(events, Event::If, tail) {
            return (Classification::Leak, Some(i));
        }
    }
    if show_all {
        for tail in [Event::Continue, Event::Break, Event::Return] {
            if let Some(i) = find_alloc_then(events, Event::IfVar, tail) {
                return (Classification::Leak, Some(i));
            }
        }
    }
    if let Some(i) = events
        .windows(3)
        .position(|w| matches!(w[0], Event::Alloc(_)) && w[1] == Event::Semi && w[2] == Event::Return)
    {
        return (Classification::Leak, Some(i + 2));
    }
    if let Some(i) = events.windows(2).position(|w| matches!(w[0], Event::Alloc(_)) && matches!(w[1], Event::Alloc(_))) {
        return (Classification::Leak, Some(i + 1));
    }
    let has_dealloc = events.iter().any(|e| matches!(e, Event::Dealloc(_)));
    let has_use = contains(events, Event::Use);
    let has_return_use = events.windows(2).any(|w| w[0] == Event::Return && w[1] == Event::Use);
    if !has_dealloc && !has_use && !has_return_use {
        return (Classification::Leak, None);
    }
    (Classification::NoFinding, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc_kind::AllocKind;

    #[test]
    fn no_alloc_is_no_finding() {
        assert_eq!(classify(&[Event::Use, Event::Semi], false), (Classification::NoFinding, None));
    }

    #[test]
    fn goto_bails() {
        let events = vec![Event::Alloc(AllocKind::Malloc), Event::Goto];
        assert_eq!(classify(&events, false), (Classification::Bail, None));
    }

    #[test]
    fn loop_alloc_is_a_leak() {
        let events = vec![Event::Loop, Event::Alloc(AllocKind::Malloc), Event::Semi];
        let (class, idx) = classify(&events, false);
        assert_eq!(class, Classification::Leak);
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn alloc_then_bare_return_is_a_leak() {
        let events = vec![Event::Alloc(AllocKind::Malloc), Event::Semi, Event::Return];
        let (class, idx) = classify(&events, false);
        assert_eq!(class, Classification::Leak);
        assert_eq!(idx, Some(2));
    }

    #[test]
    fn guarded_exit_reports_the_tail_event() {
        let events = vec![Event::Alloc(AllocKind::Malloc), Event::Semi, Event::If, Event::Return];
        let (class, idx) = classify(&events, false);
        assert_eq!(class, Classification::Leak);
        assert_eq!(idx, Some(3));
    }

    #[test]
    fn alloc_with_dealloc_is_clean() {
        let events = vec![
            Event::Alloc(AllocKind::Malloc),
            Event::Semi,
            Event::Dealloc(crate::alloc_kind::DeallocKind::Free),
            Event::Semi,
        ];
        assert_eq!(classify(&events, false), (Classification::NoFinding, None));
    }

    #[test]
    fn reassignment_without_release_is_a_leak() {
        let events = vec![Event::Alloc(AllocKind::Malloc), Event::Alloc(AllocKind::Malloc)];
        let (class, idx) = classify(&events, false);
        assert_eq!(class, Classification::Leak);
        assert_eq!(idx, Some(1));
    }
}
