//! Integration tests for context merging.

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::field::Expectation;
    use crate::fields;
    use crate::merge::{merge, new_from_contexts, MergeDescriptor, MergeMode, Merger};
    use crate::observability::{MergeObserver, MergeSpanAttributes};
    use crate::testing::{
        assert_field_absent, assert_field_eq, assert_inconsistent_merge, assert_invalid_context,
        sibling_contexts, TestIdentity,
    };
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn bare_contexts(n: usize) -> Vec<Context> {
        (0..n).map(|_| Context::background()).collect()
    }

    #[test]
    fn test_scan_fan_in() {
        let mut sources = bare_contexts(3);
        for (ctx, id) in sources.iter_mut().zip(["s1", "s2", "s3"]) {
            fields::CURRENT_BEHAVIOUR_NAME.new_context(ctx, "scan");
            fields::SOURCE_IDS.new_context(ctx, vec![id.to_string()]);
        }

        let mut target = Context::background();
        merge(&mut target, &sources).unwrap();

        assert_field_eq(&target, fields::CURRENT_BEHAVIOUR_NAME, "scan");
        assert_field_eq(
            &target,
            fields::SOURCE_IDS,
            vec!["s1".to_string(), "s2".to_string(), "s3".to_string()],
        );
    }

    #[test]
    fn test_equal_destination_ids_merge() {
        let mut sources = bare_contexts(3);
        for ctx in &mut sources {
            fields::DESTINATION_ID.new_context(ctx, "d1");
        }

        let mut target = Context::background();
        merge(&mut target, &sources).unwrap();

        assert_field_eq(&target, fields::DESTINATION_ID, "d1");
    }

    #[test]
    fn test_diverging_destination_id_fails() {
        let mut sources = bare_contexts(3);
        for (ctx, id) in sources.iter_mut().zip(["d1", "d1", "d2"]) {
            fields::DESTINATION_ID.new_context(ctx, id);
        }

        let mut target = Context::background();
        let result = merge(&mut target, &sources);

        assert_inconsistent_merge(&result, "destination-id");
    }

    #[test]
    fn test_failed_merge_leaves_target_untouched() {
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 3);
        fields::SESSION_ID.new_context(&mut sources[1], "other-session");

        let mut target = Context::background();
        target.set_value("unrelated", json!(true));
        fields::CLG_TREE_ID.new_context(&mut target, "previous");
        let before = target.to_json().unwrap();

        let result = merge(&mut target, &sources);

        assert_inconsistent_merge(&result, "session-id");
        assert_eq!(target.to_json().unwrap(), before);
    }

    #[test]
    fn test_first_failing_field_in_descriptor_order() {
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 2);
        fields::SESSION_ID.new_context(&mut sources[1], "other-session");
        fields::CLG_TREE_ID.new_context(&mut sources[1], "other-tree");

        let result = merge(&mut Context::background(), &sources);

        assert_inconsistent_merge(&result, "clg-tree-id");
    }

    #[test]
    fn test_full_identity_merge() {
        let identity = TestIdentity::new();
        let sources = sibling_contexts(&identity, 3);

        let merged = Merger::default().merge_into_new(&sources).unwrap();

        assert_field_eq(&merged, fields::SESSION_ID, identity.session_id.clone());
        assert_field_eq(&merged, fields::FIRST_BEHAVIOUR, identity.first_behaviour.clone());
        assert_field_eq(&merged, fields::CURRENT_TRIAL, identity.current_trial.clone());
        assert_field_eq(
            &merged,
            fields::SOURCE_NAMES,
            vec![
                "source-1".to_string(),
                "source-2".to_string(),
                "source-3".to_string(),
            ],
        );
        assert_field_absent(&merged, fields::EXPECTATION);
    }

    #[test]
    fn test_expectation_must_match_when_present() {
        let expectation = Expectation::default().with_entry("output", json!(["42"]));
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 2);
        fields::EXPECTATION.new_context(&mut sources[0], expectation.clone());

        assert_inconsistent_merge(&merge(&mut Context::background(), &sources), "expectation");

        fields::EXPECTATION.new_context(&mut sources[1], expectation.clone());
        let merged = Merger::default().merge_into_new(&sources).unwrap();
        assert_field_eq(&merged, fields::EXPECTATION, expectation);
    }

    #[test]
    fn test_absent_expectation_clears_target() {
        let mut target = Context::background();
        fields::EXPECTATION.new_context(
            &mut target,
            Expectation::default().with_entry("output", json!("stale")),
        );

        merge(&mut target, &bare_contexts(2)).unwrap();

        assert_field_absent(&target, fields::EXPECTATION);
    }

    #[test]
    fn test_concatenation_written_even_when_empty() {
        let merged = Merger::default().merge_into_new(&bare_contexts(3)).unwrap();

        assert_eq!(merged.value(fields::SOURCE_IDS.key()), Some(&json!([])));
        assert_eq!(merged.value(fields::SOURCE_NAMES.key()), Some(&json!([])));
        assert_field_absent(&merged, fields::DESTINATION_ID);
    }

    #[test]
    fn test_fields_outside_descriptor_are_kept() {
        let mut target = Context::background();
        target.set_value("request-local", json!({"attempt": 2}));

        merge(&mut target, &bare_contexts(2)).unwrap();

        assert_eq!(target.value("request-local"), Some(&json!({"attempt": 2})));
    }

    #[test]
    fn test_merged_context_survives_round_trip() {
        let identity = TestIdentity::new();
        let merged = Merger::default()
            .merge_into_new(&sibling_contexts(&identity, 2))
            .unwrap();

        let restored = Context::from_json(&merged.to_json().unwrap()).unwrap();

        assert_eq!(restored.values(), merged.values());
        assert_field_eq(&restored, fields::SOURCE_IDS, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn test_disabled_field_merges_as_absent() {
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 2);
        for ctx in &mut sources {
            fields::DESTINATION_ID.disable(ctx);
        }

        let merged = Merger::default().merge_into_new(&sources).unwrap();

        assert_field_absent(&merged, fields::DESTINATION_ID);
        assert!(!merged.contains_key(fields::DESTINATION_ID.restore_key()));
    }

    #[test]
    fn test_new_from_contexts_requires_fields() {
        let mut sources = bare_contexts(2);
        for ctx in &mut sources {
            fields::DESTINATION_ID.new_context(ctx, "d1");
        }

        let result = new_from_contexts(&sources);

        assert_invalid_context(&result);
        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid context: clg tree id must not be empty"
        );
    }

    #[test]
    fn test_new_from_contexts_with_complete_sources() {
        let identity = TestIdentity::new();
        let merged = new_from_contexts(&sibling_contexts(&identity, 3)).unwrap();

        assert_field_eq(&merged, fields::CLG_TREE_ID, identity.clg_tree_id.clone());
        assert_field_eq(
            &merged,
            fields::SOURCE_NAMES,
            vec![
                "source-1".to_string(),
                "source-2".to_string(),
                "source-3".to_string(),
            ],
        );
    }

    #[test]
    fn test_strict_missing_source_ids() {
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 2);
        sources[1].delete_value(fields::SOURCE_IDS.key());

        let result = Merger::default()
            .with_mode(MergeMode::Strict)
            .merge_into_new(&sources);

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid context: source ids must not be empty"
        );
    }

    #[test]
    fn test_strict_requires_current_trial() {
        let identity = TestIdentity::new();
        let mut sources = sibling_contexts(&identity, 2);
        sources[0].delete_value(fields::CURRENT_TRIAL.key());

        let result = new_from_contexts(&sources);

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid context: current trial must not be empty"
        );
    }

    #[test]
    fn test_custom_descriptor() {
        let mut sources = bare_contexts(2);
        fields::SESSION_ID.new_context(&mut sources[0], "a");
        fields::SESSION_ID.new_context(&mut sources[1], "b");
        fields::SOURCE_IDS.new_context(&mut sources[0], vec!["x".to_string()]);

        let merger = Merger::new(MergeDescriptor::new().concat(fields::SOURCE_IDS));
        let merged = merger.merge_into_new(&sources).unwrap();

        assert_eq!(merged.keys(), vec!["source-ids"]);
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl MergeObserver for RecordingObserver {
        fn merge_started(&self, attributes: &MergeSpanAttributes) {
            self.events
                .lock()
                .push(format!("started:{}", attributes.source_count));
        }

        fn merge_committed(&self, _attributes: &MergeSpanAttributes, _duration_ms: f64) {
            self.events.lock().push("committed".to_string());
        }

        fn merge_failed(&self, attributes: &MergeSpanAttributes, _error: &str) {
            self.events.lock().push(format!(
                "failed:{}",
                attributes.failed_key.clone().unwrap_or_default()
            ));
        }
    }

    #[test]
    fn test_observer_notified() {
        let observer = Arc::new(RecordingObserver::default());
        let merger = Merger::default().with_observer(observer.clone());
        let identity = TestIdentity::new();

        merger.merge_into_new(&sibling_contexts(&identity, 2)).unwrap();

        let mut sources = sibling_contexts(&identity, 2);
        fields::DESTINATION_NAME.new_context(&mut sources[0], "other");
        assert!(merger.merge_into_new(&sources).is_err());

        assert_eq!(
            *observer.events.lock(),
            vec![
                "started:2".to_string(),
                "committed".to_string(),
                "started:2".to_string(),
                "failed:destination-name".to_string(),
            ]
        );
    }
}
