    use super::*;
    use crate::model::SourceLink;

    fn populated() -> Draft {
        let mut config = QueryConfig {
            database: "telegraf".to_string(),
            retention_policy: "autogen".to_string(),
            measurement: "cpu".to_string(),
            fields: vec![Field::with_func("usage_idle", "mean")],
            source: Some(SourceLink("/sources/1".to_string())),
            ..QueryConfig::default()
        };
        config.tags.insert("host".to_string(), vec!["a".to_string()]);
        config.group_by = GroupBy {
            time: Some("10s".to_string()),
            tags: vec!["host".to_string()],
        };
        Draft::new(config)
    }

    fn catalog() -> Vec<Transform> {
        vec![
            Transform::ChooseNamespace {
                database: "db".to_string(),
                retention_policy: "rp".to_string(),
            },
            Transform::ChooseMeasurement("mem".to_string()),
            Transform::AddField(Field::new("used")),
            Transform::RemoveField("usage_idle".to_string()),
            Transform::ToggleField(Field::new("usage_user")),
            Transform::ApplyFunc {
                field: "usage_idle".to_string(),
                func: Some("max".to_string()),
            },
            Transform::GroupByTime(Some("1m".to_string())),
            Transform::GroupByTag("cpu".to_string()),
            Transform::ChooseTag {
                key: "host".to_string(),
                value: "b".to_string(),
            },
            Transform::ToggleTagAcceptance,
            Transform::Fill(Some("none".to_string())),
            Transform::SetTimeRange(Some(TimeRange::relative("now() - 6h"))),
            Transform::EditRawText("SELECT * FROM cpu".to_string()),
            Transform::ClearRawText,
        ]
    }

    #[test]
    fn idempotent_transforms_are_stable_under_reapplication() {
        let draft = populated();
        for t in catalog().into_iter().filter(Transform::is_idempotent) {
            let once = t.apply(&draft);
            let twice = t.apply(&once);
            assert_eq!(once, twice, "{} should be idempotent", t.name());
        }
    }

    #[test]
    fn additive_and_toggle_transforms_are_not_idempotent() {
        let draft = populated();
        let non_idempotent: Vec<Transform> = catalog()
            .into_iter()
            .filter(|t| !t.is_idempotent())
            .collect();
        assert_eq!(non_idempotent.len(), 5);

        for t in non_idempotent {
            let once = t.apply(&draft);
            let twice = t.apply(&once);
            assert_ne!(once, twice, "{} should change on reapplication", t.name());
        }
    }

    #[test]
    fn transforms_are_pure() {
        let draft = populated();
        let before = draft.clone();
        for t in catalog() {
            let a = t.apply(&draft);
            let b = t.apply(&draft);
            assert_eq!(a, b);
            assert_eq!(a.id(), draft.id());
        }
        assert_eq!(draft, before);
    }

    #[test]
    fn choose_namespace_resets_query_below_database() {
        let next = Transform::ChooseNamespace {
            database: "db".to_string(),
            retention_policy: "rp".to_string(),
        }
        .apply(&populated());

        let c = next.config();
        assert_eq!(c.database, "db");
        assert_eq!(c.retention_policy, "rp");
        assert!(c.measurement.is_empty());
        assert!(c.fields.is_empty());
        assert!(c.tags.is_empty());
        // Source is restored by the reducer, not by the transform.
        assert_eq!(c.source, None);
    }

    #[test]
    fn choose_measurement_keeps_time_grouping() {
        let next = Transform::ChooseMeasurement("mem".to_string()).apply(&populated());
        let c = next.config();
        assert_eq!(c.database, "telegraf");
        assert!(c.fields.is_empty());
        assert!(c.tags.is_empty());
        assert_eq!(c.group_by.time.as_deref(), Some("10s"));
        assert!(c.group_by.tags.is_empty());
    }

    #[test]
    fn choose_tag_drops_key_when_last_value_is_toggled_off() {
        let next = Transform::ChooseTag {
            key: "host".to_string(),
            value: "a".to_string(),
        }
        .apply(&populated());
        assert!(next.config().tags.is_empty());
    }

    #[test]
    fn add_field_appends_duplicates() {
        let t = Transform::AddField(Field::new("x"));
        let twice = t.apply(&t.apply(&Draft::empty()));
        assert_eq!(twice.config().fields.len(), 2);
    }
