//! Property tests: method names and config serialization.

use proptest::prelude::*;

use querymock_core::config::{MockConfig, UnsettledPolicy};
use querymock_core::{CallInfo, QueryMethod};

fn policy_strategy() -> impl Strategy<Value = UnsettledPolicy> {
    prop_oneof![Just(UnsettledPolicy::Hang), Just(UnsettledPolicy::Fail)]
}

proptest! {
    #[test]
    fn prop_method_name_survives_a_string_round_trip(
        name in "[a-zA-Z]{0,16}".prop_filter("alias of del", |s| s != "delete")
    ) {
        let method = QueryMethod::from(name.as_str());
        prop_assert_eq!(method.as_str(), name.as_str());
        prop_assert_eq!(String::from(method.clone()), name.clone());
        prop_assert_eq!(QueryMethod::from(name), method);
    }

    #[test]
    fn prop_call_method_serializes_as_its_name(
        name in "[a-z]{1,12}",
        stream in any::<bool>(),
    ) {
        let call = CallInfo::new("select 1", QueryMethod::from(name.as_str())).streaming(stream);
        let value = serde_json::to_value(&call).unwrap();
        prop_assert_eq!(value["method"].as_str(), Some(call.method.as_str()));
        let back: CallInfo = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back, call);
    }

    #[test]
    fn prop_config_toml_round_trip(
        warn_on_reinstall in any::<bool>(),
        unsettled in policy_strategy(),
        log_bindings in any::<bool>(),
    ) {
        let config = MockConfig { warn_on_reinstall, unsettled, log_bindings };
        let text = config.to_toml_string().unwrap();
        prop_assert_eq!(MockConfig::from_toml_str(&text).unwrap(), config);
    }
}
