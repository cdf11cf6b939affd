#![forbid(unsafe_code)]

//! Transition timing.
//!
//! The wait between the start and the end of a show or hide comes from the
//! content element's computed style. Transitions take precedence; the
//! animation family is consulted only when no transition duration is set.
//! The delay always comes from the same family as the duration.
//!
//! Values are re-read on every call because the markers written at the start
//! of a transition are what select the rules carrying the durations.

use std::time::Duration;

use veil_style::ComputedStyle;

/// Upper bound for a single parsed time, in milliseconds.
const MAX_TIME_MS: f64 = 1.0e12;

/// Parse one CSS `<time>`: `250ms`, `0.3s`. Bare numbers are seconds.
///
/// Unparsable, negative, and non-finite values are zero.
pub fn parse_time(value: &str) -> Duration {
    let value = value.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000.0)
    } else {
        (value.as_str(), 1000.0)
    };
    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => {
            let ms = (n * scale).min(MAX_TIME_MS);
            Duration::from_micros((ms * 1000.0).round() as u64)
        }
        _ => Duration::ZERO,
    }
}

/// Parse a comma-separated list of times. Never empty.
pub fn parse_time_list(value: &str) -> Vec<Duration> {
    value.split(',').map(parse_time).collect()
}

/// Longest `duration + delay` across a family's lists.
///
/// Delays cycle when the list is shorter than the durations.
fn family_total(durations: &[Duration], delays: &[Duration]) -> Duration {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| *d + delays.get(i % delays.len().max(1)).copied().unwrap_or_default())
        .max()
        .unwrap_or_default()
}

/// Total time to wait for the transitions (or animations) of `style`.
pub fn measure(style: &ComputedStyle) -> Duration {
    let transitions = parse_time_list(style.transition_duration());
    if transitions.iter().any(|d| !d.is_zero()) {
        return family_total(&transitions, &parse_time_list(style.transition_delay()));
    }
    let animations = parse_time_list(style.animation_duration());
    if animations.iter().any(|d| !d.is_zero()) {
        return family_total(&animations, &parse_time_list(style.animation_delay()));
    }
    Duration::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn units() {
        assert_eq!(parse_time("250ms"), ms(250));
        assert_eq!(parse_time("0.3s"), ms(300));
        assert_eq!(parse_time(" 1.5S "), ms(1500));
        assert_eq!(parse_time("2"), ms(2000));
        assert_eq!(parse_time("0s"), Duration::ZERO);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_time(""), Duration::ZERO);
        assert_eq!(parse_time("fast"), Duration::ZERO);
        assert_eq!(parse_time("-1s"), Duration::ZERO);
        assert_eq!(parse_time("NaNms"), Duration::ZERO);
        assert_eq!(parse_time("infs"), Duration::ZERO);
    }

    #[test]
    fn transition_wins_over_animation() {
        let style = ComputedStyle::from_pairs([
            ("transition-duration", "200ms"),
            ("transition-delay", "50ms"),
            ("animation-duration", "1s"),
            ("animation-delay", "1s"),
        ]);
        assert_eq!(measure(&style), ms(250));
    }

    #[test]
    fn animation_used_when_no_transition() {
        let style = ComputedStyle::from_pairs([
            ("transition-duration", "0s"),
            ("transition-delay", "5s"),
            ("animation-duration", "400ms"),
            ("animation-delay", "100ms"),
        ]);
        assert_eq!(measure(&style), ms(500));
    }

    #[test]
    fn lists_take_longest_pair() {
        let style = ComputedStyle::from_pairs([
            ("transition-duration", "100ms, 300ms, 200ms"),
            ("transition-delay", "0s, 50ms"),
        ]);
        // 100+0, 300+50, 200+0 (delay list cycles)
        assert_eq!(measure(&style), ms(350));
    }

    #[test]
    fn nothing_declared_is_zero() {
        assert_eq!(measure(&ComputedStyle::new()), Duration::ZERO);
        let delay_only = ComputedStyle::from_pairs([("transition-delay", "1s")]);
        assert_eq!(measure(&delay_only), Duration::ZERO);
    }

    proptest! {
        #[test]
        fn parse_never_panics(s in ".{0,32}") {
            let _ = parse_time(&s);
            prop_assert!(!parse_time_list(&s).is_empty());
        }

        #[test]
        fn whole_milliseconds_round_trip(n in 0u64..10_000_000) {
            prop_assert_eq!(parse_time(&format!("{n}ms")), ms(n));
        }
    }
}
