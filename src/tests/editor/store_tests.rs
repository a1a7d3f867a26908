    use super::*;
    use crate::editor::Transform;
    use crate::model::Field;

    fn link(s: &str) -> SourceLink {
        SourceLink(s.to_string())
    }

    #[test]
    fn construction_synthesizes_one_draft_when_empty() {
        let store = DraftStore::new(Vec::new(), false);
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_index(), 0);
        assert_eq!(store.active_draft().config(), &QueryConfig::default());
    }

    #[test]
    fn add_draft_appends_and_activates() {
        let mut store = DraftStore::new(Vec::new(), false);
        let first = store.drafts()[0].id().clone();

        let id = store.add_draft();
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_index(), 1);
        assert_eq!(store.active_draft().id(), &id);
        assert_ne!(id, first);
    }

    #[test]
    fn remove_draft_leaves_active_index_to_the_caller() {
        let mut store = DraftStore::new(Vec::new(), false);
        store.add_draft();
        store.add_draft();
        assert_eq!(store.active_index(), 2);

        let removed = store.remove_draft(0);
        assert!(removed.is_some());
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_index(), 2);
        // Out-of-range index falls back to the first draft until the caller fixes it.
        assert_eq!(store.active_draft().id(), store.drafts()[0].id());
    }

    #[test]
    fn removing_the_last_draft_is_refused() {
        let mut store = DraftStore::new(Vec::new(), false);
        assert!(store.remove_draft(0).is_none());
        assert!(store.remove_draft(5).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn source_for_all_then_edit_does_not_cross_mutate() {
        let mut store = DraftStore::new(vec![Draft::empty(), Draft::empty()], false);
        store.set_source_for_all(&link("/sources/2"));

        let a = store.drafts()[0].id().clone();
        let b = store.drafts()[1].id().clone();
        store.dispatch(&a, &Transform::AddField(Field::new("x")));
        store.dispatch(
            &a,
            &Transform::ChooseNamespace {
                database: "db".to_string(),
                retention_policy: String::new(),
            },
        );

        let db = store.draft(&b).unwrap();
        assert_eq!(db.config().source, Some(link("/sources/2")));
        assert!(db.config().fields.is_empty());
        assert!(db.config().database.is_empty());
        assert_eq!(store.draft(&a).unwrap().config().source, Some(link("/sources/2")));
    }

    #[test]
    fn flags_do_not_touch_drafts() {
        let mut store = DraftStore::new(Vec::new(), true);
        let before = store.drafts().to_vec();
        assert!(store.is_static_legend());

        store.toggle_static_legend(false);
        store.toggle_display_options(true);

        assert!(!store.is_static_legend());
        assert!(store.is_display_options_active());
        assert_eq!(store.drafts(), before.as_slice());
    }

    #[test]
    fn status_update_is_idempotent_and_targeted() {
        let mut store = DraftStore::new(vec![Draft::empty(), Draft::empty()], false);
        let a = store.drafts()[0].id().clone();
        let status = QueryStatus::Error("boom".to_string());

        store.apply_status_update(&a, status.clone());
        let once = store.drafts().to_vec();
        store.apply_status_update(&a, status.clone());

        assert_eq!(store.drafts(), once.as_slice());
        assert_eq!(once[0].config().status, Some(status));
        assert_eq!(once[1].config().status, None);
    }

    #[test]
    fn merge_keeps_source_and_status() {
        let mut store = DraftStore::new(
            vec![Draft::new(QueryConfig {
                source: Some(link("/sources/1")),
                status: Some(QueryStatus::Loading),
                ..QueryConfig::default()
            })],
            false,
        );
        let id = store.drafts()[0].id().clone();
        let revision = store.revision(&id).unwrap();

        let resolved = QueryConfig {
            measurement: "cpu".to_string(),
            raw_text: Some("SELECT * FROM cpu".to_string()),
            source: Some(link("/elsewhere")),
            ..QueryConfig::default()
        };
        assert_eq!(store.merge_resolved(&id, revision, resolved), MergeOutcome::Applied);

        let c = store.draft(&id).unwrap().config();
        assert_eq!(c.measurement, "cpu");
        assert_eq!(c.source, Some(link("/sources/1")));
        assert_eq!(c.status, Some(QueryStatus::Loading));
    }

    #[test]
    fn merge_after_newer_edit_is_stale() {
        let mut store = DraftStore::new(Vec::new(), false);
        let id = store.drafts()[0].id().clone();
        let revision = store.revision(&id).unwrap();

        store.dispatch(&id, &Transform::EditRawText("SELECT 2".to_string()));

        let resolved = QueryConfig {
            raw_text: Some("SELECT 1".to_string()),
            ..QueryConfig::default()
        };
        assert_eq!(store.merge_resolved(&id, revision, resolved), MergeOutcome::Stale);
        assert_eq!(store.draft(&id).unwrap().config().raw_text(), Some("SELECT 2"));
    }

    #[test]
    fn merge_for_removed_draft_is_missing() {
        let mut store = DraftStore::new(vec![Draft::empty(), Draft::empty()], false);
        let gone = store.remove_draft(1).unwrap();
        assert_eq!(
            store.merge_resolved(gone.id(), 0, QueryConfig::default()),
            MergeOutcome::Missing
        );
    }
