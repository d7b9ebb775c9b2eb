//! Property tests for the debounce state machine.

use core_events::{DebounceState, Debouncer};
use proptest::prelude::*;

proptest! {
    // Any burst whose gaps are all shorter than the window fires exactly once,
    // exactly `window` after the last notification.
    #[test]
    fn burst_fires_once_after_quiescence(window in 1u64..500, gaps in prop::collection::vec(0u64..500, 1..20)) {
        let gaps: Vec<u64> = gaps.into_iter().map(|g| g % window).collect();
        let mut d = Debouncer::new(window);
        let mut now = 0u64;
        let mut fired = 0;
        for (i, gap) in gaps.iter().enumerate() {
            if i > 0 {
                now += gap;
            }
            if d.poll(now) {
                fired += 1;
            }
            d.notify(now);
        }
        let last = now;
        for t in last..last + window {
            prop_assert!(!d.poll(t));
        }
        prop_assert!(d.poll(last + window));
        fired += 1;
        prop_assert_eq!(fired, 1);
        prop_assert_eq!(d.state(), DebounceState::Fired { at_ms: last + window });
    }

    // Cancelling at any point before the deadline suppresses the fire.
    #[test]
    fn cancel_suppresses_fire(window in 1u64..1000, at in 0u64..1000) {
        let mut d = Debouncer::new(window);
        d.notify(0);
        let cancel_at = at % window;
        prop_assert!(!d.poll(cancel_at));
        prop_assert!(d.cancel());
        prop_assert!(!d.poll(window * 10));
    }
}
