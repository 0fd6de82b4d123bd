//! Stage 2: fixed-point term rewriting over the reduced event
//! stream. Each rule is a literal sequence match-and-replace; the outer
//! loop reapplies the whole rule set until nothing changes.
//!
//! A parallel `locations` vector tracks, for each surviving event, the
//! token it came from (`None` for events synthesized by a rule rather
//! than carried over from the original statement). Rules that keep an
//! event verbatim carry its location across the splice; rules that
//! manufacture a new event (an empty-block `Semi`, say) drop the location
//! since nothing in the source maps to it.

use super::events::Event;
use cc_lex::TokenId;

fn is_if_like(e: Event) -> bool {
    matches!(
        e,
        Event::If | Event::IfVar | Event::IfVarTrue | Event::IfVarFalse | Event::IfTrue | Event::IfFalse
    )
}

fn splice(events: &mut Vec<Event>, locations: &mut Vec<Option<TokenId>>, at: usize, len: usize, ev: &[Event], loc: &[Option<TokenId>]) {
    events.splice(at..at + len, ev.iter().copied());
    locations.splice(at..at + len, loc.iter().copied());
}

fn desugar_do_while(events: &mut Vec<Event>, locations: &mut Vec<Option<TokenId>>) -> bool {
    for i in 0..events.len() {
        if events[i] != Event::Do {
            continue;
        }
        if events.get(i + 1) != Some(&Event::Open) {
            continue;
        }
        let mut depth = 0i64;
        let mut j = i + 1;
        let close = loop {
            match events.get(j) {
                Some(Event::Open) => depth += 1,
                Some(Event::Close) => {
                    depth -= 1;
                    if depth == 0 {
                        break j;
                    }
                }
                Some(_) => {}
                None => return false,
            }
            j += 1;
        };
        if events.get(close + 1) != Some(&Event::Loop) {
            continue;
        }
        let body: Vec<Event> = events[i + 1..=close].to_vec();
        let body_locs: Vec<Option<TokenId>> = locations[i + 1..=close].to_vec();
        let mut replacement = body.clone();
        replacement.push(Event::Loop);
        replacement.extend(body);
        let mut replacement_locs = body_locs.clone();
        replacement_locs.push(None);
        replacement_locs.extend(body_locs);
        splice(events, locations, i, close + 2 - i, &replacement, &replacement_locs);
        return true;
    }
    false
}

/// One pass of every literal rewrite rule. Returns whether anything changed.
fn apply_rules_once(events: &mut Vec<Event>, locations: &mut Vec<Option<TokenId>>, show_all: bool) -> bool {
    let n = events.len();

    for i in 0..n.saturating_sub(1) {
        if i + 1 < events.len() && events[i] == Event::Semi && events[i + 1] == Event::Semi {
            let loc = [locations[i]];
            splice(events, locations, i, 2, &[Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(1) {
        if events[i] == Event::Open && events[i + 1] == Event::Close {
            splice(events, locations, i, 2, &[Event::Semi], &[None]);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(2) {
        if events[i] == Event::Open && events[i + 2] == Event::Close {
            let stmt = events[i + 1];
            if !matches!(stmt, Event::Open | Event::Close) {
                let loc = [locations[i + 1]];
                splice(events, locations, i, 3, &[stmt], &loc);
                return true;
            }
        }
    }
    for i in 0..events.len().saturating_sub(4) {
        if events[i] == Event::Open
            && events[i + 1] == Event::Return
            && events[i + 2] == Event::Use
            && events[i + 3] == Event::Semi
            && events[i + 4] == Event::Close
        {
            let loc = [locations[i + 1], locations[i + 2], locations[i + 3]];
            splice(events, locations, i, 5, &[Event::Return, Event::Use, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(1) {
        if is_if_like(events[i]) && events[i + 1] == Event::Semi {
            let followed_by_else = events.get(i + 2) == Some(&Event::Else);
            if !followed_by_else {
                splice(events, locations, i, 2, &[], &[]);
                return true;
            }
        }
    }
    if show_all {
        for i in 0..events.len().saturating_sub(2) {
            if is_if_like(events[i])
                && matches!(events[i + 1], Event::Dealloc(_) | Event::Use)
                && events[i + 2] == Event::Semi
            {
                let followed_by_else = events.get(i + 3) == Some(&Event::Else);
                if !followed_by_else {
                    splice(events, locations, i, 1, &[], &[]);
                    return true;
                }
            }
        }
    }
    for i in 0..events.len().saturating_sub(5) {
        if matches!(events[i], Event::Alloc(_))
            && events[i + 1] == Event::Semi
            && is_if_like(events[i + 2])
            && events[i + 3] == Event::Return
            && events[i + 4] == Event::Use
            && events[i + 5] == Event::Semi
        {
            let followed_by_else = events.get(i + 6) == Some(&Event::Else);
            if !followed_by_else {
                splice(events, locations, i + 2, 4, &[], &[]);
                return true;
            }
        }
    }
    for i in 0..events.len().saturating_sub(6) {
        let boundary = matches!(events[i], Event::Semi | Event::Open | Event::Close);
        if boundary
            && is_if_like(events[i + 1])
            && matches!(events[i + 2], Event::Alloc(_))
            && events[i + 3] == Event::Semi
            && events[i + 4] == Event::Else
            && events[i + 5] == Event::Return
            && events[i + 6] == Event::Semi
        {
            let alloc = events[i + 2];
            let loc = [locations[i + 2], locations[i + 3]];
            splice(events, locations, i + 1, 6, &[alloc, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(2) {
        if matches!(events[i], Event::Dealloc(_)) && events[i + 1] == Event::Use && events[i + 2] == Event::Semi {
            let dealloc = events[i];
            let loc = [locations[i], locations[i + 2]];
            splice(events, locations, i, 3, &[dealloc, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(3) {
        if is_if_like(events[i])
            && matches!(events[i + 1], Event::Dealloc(_) | Event::Use)
            && events[i + 2] == Event::Semi
            && events[i + 3] == Event::Else
        {
            let inner = events[i + 1];
            let loc = [locations[i + 1], locations[i + 2]];
            splice(events, locations, i, 3, &[inner, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(6) {
        let boundary = matches!(events[i], Event::Semi | Event::Open | Event::Close);
        if boundary
            && is_if_like(events[i + 1])
            && events[i + 2] == Event::Open
            && matches!(events[i + 3], Event::Dealloc(_))
            && events[i + 4] == Event::Semi
            && events[i + 5] == Event::Return
            && events[i + 6] == Event::Semi
        {
            if events.get(i + 8) == Some(&Event::Close) && events.get(i + 9) != Some(&Event::Else) {
                splice(events, locations, i + 1, 8, &[], &[]);
                return true;
            }
        }
    }
    for i in 0..events.len().saturating_sub(1) {
        if events[i] == Event::Loop && events[i + 1] == Event::Semi {
            let loc = [locations[i + 1]];
            splice(events, locations, i, 2, &[Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(2) {
        if events[i] == Event::Loop && events[i + 1] == Event::NotVar && events[i + 2] == Event::Semi {
            let loc = [locations[i + 2]];
            splice(events, locations, i, 3, &[Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(3) {
        if events[i] == Event::Loop
            && events[i + 1] == Event::NotVar
            && matches!(events[i + 2], Event::Alloc(_))
            && events[i + 3] == Event::Semi
        {
            let alloc = events[i + 2];
            let loc = [locations[i + 2], locations[i + 3]];
            splice(events, locations, i, 4, &[alloc, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(4) {
        if matches!(events[i], Event::Alloc(_))
            && events[i + 1] == Event::Semi
            && events[i + 2] == Event::IfVarFalse
            && events[i + 3] == Event::Return
            && events[i + 4] == Event::Semi
        {
            let alloc = events[i];
            let loc = [locations[i], locations[i + 1]];
            splice(events, locations, i, 5, &[alloc, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len().saturating_sub(3) {
        if events[i] == Event::Use && events[i + 1] == Event::Semi && events[i + 2] == Event::Use && events[i + 3] == Event::Semi {
            let loc = [locations[i], locations[i + 1]];
            splice(events, locations, i, 4, &[Event::Use, Event::Semi], &loc);
            return true;
        }
        if events[i] == Event::Case && events[i + 1] == Event::Semi && events[i + 2] == Event::Case && events[i + 3] == Event::Semi {
            let loc = [locations[i], locations[i + 1]];
            splice(events, locations, i, 4, &[Event::Case, Event::Semi], &loc);
            return true;
        }
    }
    for i in 0..events.len() {
        if events[i] == Event::Throw {
            events[i] = Event::Return;
            return true;
        }
    }

    false
}

/// Runs stage 2 to a fixed point, discarding location information.
/// Used by callers that only need the reduced event shape.
pub fn reduce_events(events: &mut Vec<Event>) {
    let mut locations = vec![None; events.len()];
    reduce_events_located(events, &mut locations, false);
}

pub fn reduce_events_mode(events: &mut Vec<Event>, show_all: bool) {
    let mut locations = vec![None; events.len()];
    reduce_events_located(events, &mut locations, show_all);
}

/// Runs stage 2 to a fixed point, keeping `locations` in lockstep with
/// `events` so the event that finally triggers a leak classification can
/// be traced back to its token.
pub fn reduce_events_located(events: &mut Vec<Event>, locations: &mut Vec<Option<TokenId>>, show_all: bool) {
    desugar_do_while(events, locations);
    loop {
        if !apply_rules_once(events, locations, show_all) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc_kind::{AllocKind, DeallocKind};

    #[test]
    fn collapses_double_semicolons() {
        let mut events = vec![Event::Semi, Event::Semi];
        reduce_events(&mut events);
        assert_eq!(events, vec![Event::Semi]);
    }

    #[test]
    fn collapses_empty_block() {
        let mut events = vec![Event::Open, Event::Close];
        reduce_events(&mut events);
        assert_eq!(events, vec![Event::Semi]);
    }

    #[test]
    fn strips_guard_with_no_interesting_body() {
        let mut events = vec![Event::IfVar, Event::Semi];
        reduce_events(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn merges_dealloc_then_use() {
        let mut events = vec![Event::Dealloc(DeallocKind::Free), Event::Use, Event::Semi];
        reduce_events(&mut events);
        assert_eq!(events, vec![Event::Dealloc(DeallocKind::Free), Event::Semi]);
    }

    #[test]
    fn alloc_followed_by_guarded_return_use_collapses() {
        let mut events = vec![
            Event::Alloc(AllocKind::Malloc),
            Event::Semi,
            Event::IfVar,
            Event::Return,
            Event::Use,
            Event::Semi,
        ];
        reduce_events(&mut events);
        assert_eq!(events, vec![Event::Alloc(AllocKind::Malloc), Event::Semi]);
    }

    #[test]
    fn throw_becomes_return() {
        let mut events = vec![Event::Throw];
        reduce_events(&mut events);
        assert_eq!(events, vec![Event::Return]);
    }

    #[test]
    fn do_while_desugars_by_duplicating_body() {
        let mut events = vec![
            Event::Do,
            Event::Open,
            Event::Dealloc(DeallocKind::Free),
            Event::Semi,
            Event::Close,
            Event::Loop,
        ];
        let mut locations = vec![None; events.len()];
        desugar_do_while(&mut events, &mut locations);
        assert_eq!(
            events,
            vec![
                Event::Open,
                Event::Dealloc(DeallocKind::Free),
                Event::Semi,
                Event::Close,
                Event::Loop,
                Event::Open,
                Event::Dealloc(DeallocKind::Free),
                Event::Semi,
                Event::Close,
            ]
        );
    }

    #[test]
    fn guarded_return_after_alloc_keeps_the_return_location() {
        use cc_lex::{FileId, TokenStore};
        let mut store = TokenStore::new();
        let alloc_tok = store.create_at_end("malloc", FileId::TOP_LEVEL, 1);
        let _semi_tok = store.create_at_end(";", FileId::TOP_LEVEL, 1);
        let _if_tok = store.create_at_end("if", FileId::TOP_LEVEL, 2);
        let return_tok = store.create_at_end("return", FileId::TOP_LEVEL, 2);

        let mut events = vec![Event::Alloc(AllocKind::Malloc), Event::Semi, Event::If, Event::Return];
        let mut locations = vec![Some(alloc_tok), Some(_semi_tok), Some(_if_tok), Some(return_tok)];
        reduce_events_located(&mut events, &mut locations, false);

        assert_eq!(events, vec![Event::Alloc(AllocKind::Malloc), Event::Semi, Event::If, Event::Return]);
        assert_eq!(locations[3], Some(return_tok));
    }
}
