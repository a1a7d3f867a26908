    use super::*;
    use std::sync::Mutex;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::model::{CellQuery, CellType, Legend, SourceLinks};
    use crate::remote::{ParsedQuery, RawQuery};

    #[derive(Default)]
    struct Recorder {
        saved: Vec<Cell>,
        cancels: usize,
    }

    impl CellSink for Recorder {
        fn on_save(&mut self, cell: Cell) {
            self.saved.push(cell);
        }
        fn on_cancel(&mut self) {
            self.cancels += 1;
        }
    }

    /// Parses nothing; echoes raw text back with a fixed measurement and a
    /// foreign source, optionally holding each reply until released.
    struct EchoService {
        gate: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
        fail: bool,
    }

    impl EchoService {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                gate: Mutex::new(None),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                gate: Mutex::new(None),
                fail: true,
            })
        }

        fn gated() -> (Arc<Self>, std::sync::mpsc::Sender<()>) {
            let (tx, rx) = std::sync::mpsc::channel();
            (
                Arc::new(Self {
                    gate: Mutex::new(Some(rx)),
                    fail: false,
                }),
                tx,
            )
        }
    }

    impl ParseService for EchoService {
        fn parse(
            &self,
            _endpoint: &str,
            queries: &[RawQuery],
            _templates: &[Template],
        ) -> anyhow::Result<Vec<ParsedQuery>> {
            if let Some(rx) = self.gate.lock().unwrap().as_ref() {
                let _ = rx.recv_timeout(Duration::from_secs(5));
            }
            if self.fail {
                anyhow::bail!("503 service unavailable");
            }
            Ok(queries
                .iter()
                .map(|q| ParsedQuery {
                    id: q.id.clone(),
                    query: q.query.clone(),
                    query_config: QueryConfig {
                        measurement: "cpu".to_string(),
                        raw_text: Some(q.query.clone()),
                        source: Some(SourceLink("/from/service".to_string())),
                        ..QueryConfig::default()
                    },
                })
                .collect())
        }
    }

    fn source(id: &str) -> Source {
        Source {
            id: id.to_string(),
            name: format!("influx-{}", id),
            url: format!("http://influx-{}:8086", id),
            links: SourceLinks {
                self_link: format!("/sources/{}", id),
                queries: format!("/sources/{}/queries", id),
            },
        }
    }

    fn cell(queries: Vec<CellQuery>, legend: Legend) -> Cell {
        Cell {
            i: "cell-1".to_string(),
            name: "CPU".to_string(),
            kind: CellType("line".to_string()),
            x: 0,
            y: 0,
            w: 4,
            h: 4,
            queries,
            colors: Vec::new(),
            legend,
            axes: serde_json::Value::Null,
        }
    }

    fn inputs(c: Cell) -> EditorInputs {
        EditorInputs {
            cell: c,
            sources: vec![source("1"), source("2")],
            default_source: source("1"),
            templates: Vec::new(),
            time_range: TimeRange::relative("now() - 1h"),
            auto_refresh: Duration::from_secs(10),
            palettes: CellPalettes::default(),
        }
    }

    fn open_with(c: Cell, service: Arc<dyn ParseService>) -> CellEditor {
        CellEditor::open(inputs(c), service, DEFAULT_SAVE_DELAY)
    }

    fn open_empty() -> CellEditor {
        open_with(cell(Vec::new(), Legend::default()), EchoService::new())
    }

    fn complete_query() -> QueryConfig {
        QueryConfig {
            database: "telegraf".to_string(),
            measurement: "cpu".to_string(),
            fields: vec![Field::with_func("usage_idle", "mean")],
            ..QueryConfig::default()
        }
    }

    fn stored(q: QueryConfig, src: Option<&str>) -> CellQuery {
        CellQuery {
            query: String::new(),
            query_config: q,
            source: src.map(|s| SourceLink(s.to_string())),
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_text(ed: &mut CellEditor, text: &str) {
        ed.input_mut().clear();
        for c in text.chars() {
            ed.input_mut().insert_char(c);
        }
    }

    #[test]
    fn opening_an_empty_cell_synthesizes_one_sourced_draft() {
        let ed = open_empty();
        assert_eq!(ed.store().len(), 1);
        assert_eq!(ed.store().active_index(), 0);
        assert_eq!(
            ed.store().drafts()[0].config().source,
            Some(SourceLink("/sources/1".to_string()))
        );
        assert_eq!(ed.focus(), Some(FocusTarget::Container));
        assert!(!ed.store().is_static_legend());
    }

    #[test]
    fn opening_stamps_first_query_source_on_every_draft() {
        let c = cell(
            vec![
                stored(complete_query(), Some("/sources/2")),
                stored(QueryConfig::default(), None),
            ],
            Legend::static_bottom(),
        );
        let ed = open_with(c, EchoService::new());

        assert_eq!(ed.store().len(), 2);
        for d in ed.store().drafts() {
            assert_eq!(d.config().source, Some(SourceLink("/sources/2".to_string())));
        }
        assert!(ed.store().is_static_legend());
        assert_eq!(ed.effective_source().id, "2");
        assert_eq!(ed.selected_source_label(), "influx-2 @ http://influx-2:8086");
    }

    #[test]
    fn unknown_source_link_labels_as_no_sources() {
        let c = cell(vec![stored(complete_query(), Some("/gone"))], Legend::default());
        let ed = open_with(c, EchoService::new());
        assert_eq!(ed.selected_source_label(), "No sources");
        assert_eq!(ed.effective_source().id, "1");
    }

    #[test]
    fn active_index_stays_valid_across_add_delete_select() {
        let mut ed = open_empty();
        // Deterministic pseudo-random walk over the public operations.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let len = ed.store().len();
            match seed % 3 {
                0 => {
                    ed.add_query();
                }
                1 => {
                    ed.delete_query((seed as usize / 3) % (len + 1));
                }
                _ => {
                    ed.set_active_query((seed as usize / 3) % (len + 1));
                }
            }
            assert!(!ed.store().is_empty());
            assert!(ed.store().active_index() < ed.store().len());
        }
    }

    #[test]
    fn deleting_the_only_query_is_refused() {
        let mut ed = open_empty();
        assert!(!ed.delete_query(0));
        assert_eq!(ed.store().len(), 1);
    }

    #[test]
    fn deleting_before_the_active_query_keeps_it_active() {
        let mut ed = open_empty();
        ed.add_query();
        let third = ed.add_query();
        assert_eq!(ed.store().active_index(), 2);

        assert!(ed.delete_query(0));
        assert_eq!(ed.store().active_draft().id(), &third);
    }

    #[test]
    fn source_change_then_edit_stays_isolated() {
        let mut ed = open_with(
            cell(
                vec![stored(complete_query(), None), stored(complete_query(), None)],
                Legend::default(),
            ),
            EchoService::new(),
        );
        ed.set_query_source(&source("2"));
        let a = ed.store().drafts()[0].id().clone();
        let b = ed.store().drafts()[1].id().clone();

        ed.dispatch(&a, &Transform::RemoveField("usage_idle".to_string()));

        let other = ed.store().draft(&b).unwrap().config();
        assert_eq!(other.source, Some(SourceLink("/sources/2".to_string())));
        assert_eq!(other.fields.len(), 1);
    }

    #[test]
    fn save_is_gated_by_validity() {
        let mut ed = open_empty();
        let mut sink = Recorder::default();

        assert!(!ed.is_savable());
        assert!(!ed.save(&mut sink));
        assert!(sink.saved.is_empty());
        assert!(ed.is_open());

        let id = ed.store().drafts()[0].id().clone();
        ed.dispatch(
            &id,
            &Transform::ChooseNamespace {
                database: "telegraf".to_string(),
                retention_policy: "autogen".to_string(),
            },
        );
        ed.dispatch(&id, &Transform::ChooseMeasurement("cpu".to_string()));
        ed.dispatch(&id, &Transform::AddField(Field::new("usage_idle")));
        assert!(ed.save(&mut sink));
        assert_eq!(sink.saved.len(), 1);
        assert_eq!(ed.state(), EditorState::Saved);

        // One payload per save; the overlay is done afterwards.
        assert!(!ed.save(&mut sink));
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn static_legend_toggle_reaches_the_payload() {
        let c = cell(vec![stored(complete_query(), None)], Legend::default());
        let mut ed = open_with(c, EchoService::new());
        let mut sink = Recorder::default();

        ed.toggle_static_legend(true);
        ed.toggle_display_options(true);
        assert!(ed.save(&mut sink));
        assert_eq!(sink.saved[0].legend, Legend::static_bottom());
        assert!(sink.saved[0].queries[0].query.starts_with("SELECT mean(\"usage_idle\")"));
    }

    #[test]
    fn modified_enter_on_container_saves_synchronously_once() {
        let c = cell(vec![stored(complete_query(), None)], Legend::default());
        let mut ed = open_with(c, EchoService::new());
        let mut sink = Recorder::default();

        let handled = ed.handle_key(
            &key(KeyCode::Enter, KeyModifiers::ALT),
            Instant::now(),
            &mut sink,
        );
        assert!(handled);
        assert_eq!(sink.saved.len(), 1);
        assert!(!ed.has_pending_save());
    }

    #[test]
    fn modified_enter_in_input_commits_before_deferred_save() {
        let c = cell(vec![stored(complete_query(), None)], Legend::default());
        let mut ed = open_with(c, EchoService::new());
        let mut sink = Recorder::default();

        ed.focus_input(InputField::Measurement);
        assert_eq!(ed.input().as_str(), "cpu");
        type_text(&mut ed, "mem");
        // The measurement reset cleared the fields; re-add one in the same pass.
        ed.focus_input(InputField::Fields);
        type_text(&mut ed, "max(used)");

        let t0 = Instant::now();
        ed.handle_key(&key(KeyCode::Enter, KeyModifiers::CONTROL), t0, &mut sink);

        // Blurred and committed, save not yet fired.
        assert_eq!(ed.focus(), None);
        assert!(sink.saved.is_empty());
        assert!(ed.has_pending_save());
        assert_eq!(
            ed.store().active_draft().config().fields,
            vec![Field::with_func("used", "max")]
        );

        ed.tick(t0 + Duration::from_millis(10), &mut sink);
        assert!(sink.saved.is_empty());

        ed.tick(t0 + DEFAULT_SAVE_DELAY, &mut sink);
        assert_eq!(sink.saved.len(), 1);
        let q = &sink.saved[0].queries[0];
        assert_eq!(q.query_config.measurement, "mem");
        assert!(q.query.contains("max(\"used\") AS \"max_used\""));

        ed.tick(t0 + Duration::from_secs(1), &mut sink);
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn escape_in_input_returns_focus_without_cancelling() {
        let mut ed = open_empty();
        let mut sink = Recorder::default();

        ed.focus_input(InputField::Database);
        type_text(&mut ed, "telegraf");
        ed.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE), Instant::now(), &mut sink);

        assert_eq!(sink.cancels, 0);
        assert_eq!(ed.focus(), Some(FocusTarget::Container));
        assert_eq!(ed.store().active_draft().config().database, "telegraf");

        ed.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE), Instant::now(), &mut sink);
        assert_eq!(sink.cancels, 1);
        assert_eq!(ed.state(), EditorState::Cancelled);
    }

    #[test]
    fn escape_on_button_cancels_directly() {
        let mut ed = open_empty();
        let mut sink = Recorder::default();
        ed.focus_control(FocusTarget::Button);
        ed.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE), Instant::now(), &mut sink);
        assert_eq!(sink.cancels, 1);
    }

    #[test]
    fn unbound_keys_are_left_to_the_focused_element() {
        let mut ed = open_empty();
        let mut sink = Recorder::default();
        assert!(!ed.handle_key(
            &key(KeyCode::Enter, KeyModifiers::NONE),
            Instant::now(),
            &mut sink
        ));
        assert!(!ed.handle_key(
            &key(KeyCode::Char('x'), KeyModifiers::NONE),
            Instant::now(),
            &mut sink
        ));
        assert!(sink.saved.is_empty());
        assert_eq!(sink.cancels, 0);
    }

    #[test]
    fn raw_text_resolution_keeps_the_draft_source() {
        let mut ed = open_empty();
        let id = ed.store().drafts()[0].id().clone();

        ed.submit_raw_text(&id, "SELECT * FROM cpu");
        assert_eq!(ed.wait_for_resolutions(Duration::from_secs(5)), 1);

        let c = ed.store().draft(&id).unwrap().config();
        assert_eq!(c.measurement, "cpu");
        assert_eq!(c.raw_text(), Some("SELECT * FROM cpu"));
        assert_eq!(c.source, Some(SourceLink("/sources/1".to_string())));
        assert!(ed.is_savable());
    }

    #[test]
    fn failed_resolution_leaves_the_draft_alone() {
        let mut ed = open_with(cell(Vec::new(), Legend::default()), EchoService::failing());
        let id = ed.store().drafts()[0].id().clone();

        ed.submit_raw_text(&id, "SELECT * FROM cpu");
        let before = ed.store().draft(&id).unwrap().clone();
        assert_eq!(ed.wait_for_resolutions(Duration::from_secs(5)), 0);

        assert_eq!(ed.store().draft(&id).unwrap(), &before);
        assert_eq!(ed.pending_resolutions(), 0);
    }

    #[test]
    fn edit_during_resolution_wins_over_the_late_response() {
        let (svc, release) = EchoService::gated();
        let mut ed = open_with(cell(Vec::new(), Legend::default()), svc);
        let id = ed.store().drafts()[0].id().clone();

        ed.submit_raw_text(&id, "SELECT * FROM cpu");
        ed.dispatch(&id, &Transform::EditRawText("SELECT * FROM mem".to_string()));
        release.send(()).unwrap();

        assert_eq!(ed.wait_for_resolutions(Duration::from_secs(5)), 0);
        let c = ed.store().draft(&id).unwrap().config();
        assert_eq!(c.raw_text(), Some("SELECT * FROM mem"));
        assert!(c.measurement.is_empty());
    }

    #[test]
    fn resolution_for_deleted_draft_is_dropped() {
        let (svc, release) = EchoService::gated();
        let mut ed = open_with(cell(Vec::new(), Legend::default()), svc);
        let doomed = ed.add_query();

        ed.submit_raw_text(&doomed, "SELECT 1");
        assert!(ed.delete_query(1));
        release.send(()).unwrap();

        assert_eq!(ed.wait_for_resolutions(Duration::from_secs(5)), 0);
        assert_eq!(ed.store().len(), 1);
        assert!(ed.store().draft(&doomed).is_none());
    }

    #[test]
    fn status_feed_updates_one_draft() {
        let mut ed = open_empty();
        let second = ed.add_query();
        ed.apply_status_update(&second, QueryStatus::Loading);
        ed.apply_status_update(&second, QueryStatus::Loading);

        assert_eq!(ed.store().drafts()[0].config().status, None);
        assert_eq!(
            ed.store().draft(&second).unwrap().config().status,
            Some(QueryStatus::Loading)
        );
    }

    #[test]
    fn field_list_edits_use_registry_operations() {
        let current = vec![Field::new("a"), Field::with_func("b", "mean")];
        let wanted = parse_field_list("max(b), c");
        assert_eq!(
            field_edits(&current, &wanted),
            vec![
                Transform::RemoveField("a".to_string()),
                Transform::ApplyFunc {
                    field: "b".to_string(),
                    func: Some("max".to_string()),
                },
                Transform::AddField(Field::new("c")),
            ]
        );
    }
