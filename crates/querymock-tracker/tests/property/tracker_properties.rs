//! Property tests: step numbering, history indexing, session reset.

use proptest::prelude::*;

use querymock_core::{CallInfo, QueryMethod};
use querymock_tracker::{Capture, Tracker};

fn method_strategy() -> impl Strategy<Value = QueryMethod> {
    prop_oneof![
        Just(QueryMethod::Select),
        Just(QueryMethod::First),
        Just(QueryMethod::Pluck),
        Just(QueryMethod::Insert),
        Just(QueryMethod::Update),
        Just(QueryMethod::Del),
        Just(QueryMethod::Raw),
    ]
}

fn calls(max: usize) -> impl Strategy<Value = Vec<CallInfo>> {
    prop::collection::vec(
        ("[a-z]{1,12}", method_strategy(), any::<bool>()).prop_map(|(table, method, trx)| {
            CallInfo::new(format!(r#"select * from "{table}""#), method).transacting(trx)
        }),
        0..max,
    )
}

proptest! {
    #[test]
    fn prop_history_indexes_match_capture_order(calls in calls(40)) {
        let tracker = Tracker::new();
        tracker.install();

        let mut pending = Vec::new();
        for call in &calls {
            match tracker.capture(call.clone()).unwrap() {
                Capture::Intercepted(p) => pending.push(p),
                Capture::NotIntercepted(_) => prop_assert!(false, "tracker is installed"),
            }
        }

        let queries = tracker.queries();
        prop_assert_eq!(queries.count(), calls.len());
        let mut next = 1;
        for (call, pending) in calls.iter().zip(&pending) {
            let record = queries.step(next).unwrap();
            prop_assert_eq!(record.step(), next);
            prop_assert_eq!(record.call(), call);
            prop_assert_eq!(pending.step(), next);
            next += 1;
        }
        prop_assert!(queries.step(next).is_err());
        prop_assert!(queries.step(0).is_err());
    }

    #[test]
    fn prop_uninstalled_tracker_never_records(calls in calls(20)) {
        let tracker = Tracker::new();
        tracker.install();
        tracker.uninstall();
        tracker.on(|_, _| anyhow::bail!("must not be called"));

        for call in calls {
            let is_passthrough = matches!(tracker.capture(call).unwrap(), Capture::NotIntercepted(_));
            prop_assert!(is_passthrough);
        }
        prop_assert_eq!(tracker.queries().count(), 0);
    }

    #[test]
    fn prop_install_resets_history(first in calls(20), second in calls(20)) {
        let tracker = Tracker::new();
        tracker.install();
        for call in first {
            tracker.capture(call).unwrap();
        }
        tracker.uninstall();
        tracker.install();
        prop_assert_eq!(tracker.queries().count(), 0);

        for call in &second {
            tracker.capture(call.clone()).unwrap();
        }
        let queries = tracker.queries();
        prop_assert_eq!(queries.count(), second.len());
        if let Ok(last) = queries.last() {
            prop_assert_eq!(queries.first().unwrap().step(), 1);
            prop_assert!(queries.step(last.step()).unwrap().same_record(&last));
            prop_assert!(queries.step(last.step() + 1).is_err());
        }
    }
}
