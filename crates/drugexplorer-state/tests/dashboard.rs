//! Dashboard dispatcher against an in-memory data source.
//!
//! Run with: cargo test --package drugexplorer-state --test dashboard

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use drugexplorer_common::config::{DashboardConfig, SelectionConfig};
use drugexplorer_common::entities::{
    AttentionRecord, DiseaseOption, DrugPredictionRecord, EdgeTypeCatalog, MetaPathCatalog,
    NodeNameDict,
};
use drugexplorer_common::{DrugExplorerError, Result};
use drugexplorer_data::{DataSource, Resource};
use drugexplorer_state::{Dashboard, Predictions, StateEvent, PALETTE};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;

#[derive(Default)]
struct FakeSource {
    /// disease id -> (release gate, ranked records)
    predictions: HashMap<String, (Arc<Notify>, Vec<DrugPredictionRecord>)>,
    /// first requested node id -> release gate
    attention_gates: HashMap<String, Arc<Notify>>,
    fail_node_names: bool,
    fail_attention: bool,
}

impl FakeSource {
    /// Predictions for `disease_id`, held back until the returned gate is notified.
    fn gated(&mut self, disease_id: &str, drug_ids: &[&str]) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let records = drug_ids
            .iter()
            .enumerate()
            .map(|(i, id)| DrugPredictionRecord {
                id: id.to_string(),
                score: 4.0 - i as f64,
                known: i == 0,
            })
            .collect();
        self.predictions
            .insert(disease_id.to_string(), (gate.clone(), records));
        gate
    }

    /// Hold back attention requests whose first node id is `node_id`.
    fn gate_attention(&mut self, node_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.attention_gates.insert(node_id.to_string(), gate.clone());
        gate
    }

    /// Predictions for `disease_id` available immediately.
    fn ready(&mut self, disease_id: &str, drug_ids: &[&str]) {
        self.gated(disease_id, drug_ids).notify_one();
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn fetch_node_types(&self) -> Result<Vec<String>> {
        Ok(vec!["disease".into(), "drug".into(), "gene/protein".into()])
    }

    async fn fetch_edge_types(&self) -> Result<EdgeTypeCatalog> {
        let catalog = json!({"indication": {"edgeInfo": "drug -> disease"}});
        Ok(catalog.as_object().cloned().unwrap_or_default())
    }

    async fn fetch_meta_paths(&self) -> Result<MetaPathCatalog> {
        Ok(json!([["drug", "gene/protein", "disease"]]))
    }

    async fn fetch_attention(&self, node_ids: &[Option<String>]) -> Result<AttentionRecord> {
        let first = node_ids.iter().flatten().next();
        if let Some(gate) = first.and_then(|id| self.attention_gates.get(id)) {
            gate.notified().await;
        }
        if self.fail_attention {
            return Err(DrugExplorerError::fetch("attention", "HTTP 503"));
        }
        let dataset: AttentionRecord = HashMap::from([
            ("id1".to_string(), json!([0.9])),
            ("id2".to_string(), json!([0.5])),
            ("id3".to_string(), json!([0.1])),
        ]);
        Ok(drugexplorer_data::filter_attention(dataset, node_ids))
    }

    async fn fetch_disease_options(&self) -> Result<Vec<DiseaseOption>> {
        Ok(vec![
            DiseaseOption("D1".into(), true),
            DiseaseOption("D2".into(), false),
            DiseaseOption("D3".into(), true),
        ])
    }

    async fn fetch_node_names(&self) -> Result<NodeNameDict> {
        if self.fail_node_names {
            return Err(DrugExplorerError::fetch("node_names", "HTTP 500"));
        }
        let mut names = NodeNameDict::new();
        names.insert(
            "disease".into(),
            HashMap::from([
                ("D1".to_string(), "asthma".to_string()),
                ("D2".to_string(), "gout".to_string()),
                ("D3".to_string(), "cancer".to_string()),
            ]),
        );
        names.insert(
            "drug".into(),
            HashMap::from([("A".to_string(), "Aspirin".to_string())]),
        );
        Ok(names)
    }

    async fn fetch_drug_predictions(&self, disease_id: &str) -> Result<Vec<DrugPredictionRecord>> {
        let Some((gate, records)) = self.predictions.get(disease_id) else {
            return Err(DrugExplorerError::fetch("drug_predictions", "HTTP 404"));
        };
        gate.notified().await;
        Ok(records.clone())
    }
}

async fn loaded_dashboard(source: FakeSource) -> Dashboard<FakeSource> {
    let dashboard = Dashboard::new(source, &SelectionConfig::default());
    dashboard.load_catalogs().await;
    dashboard
}

fn drug_ids(predictions: &Predictions) -> Vec<String> {
    predictions.drugs().iter().map(|d| d.id.clone()).collect()
}

#[tokio::test]
async fn test_catalogs_populate_state_and_colors() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;
    let state = dashboard.snapshot();

    assert_eq!(state.node_types, vec!["disease", "drug", "gene/protein"]);
    assert_eq!(state.meta_paths, json!([["drug", "gene/protein", "disease"]]));
    assert!(state.edge_types.contains_key("indication"));
    assert!(state.pending.is_empty());
    assert!(state.fetch_errors.is_empty());

    // "cancer" is excluded by the default configuration.
    let names: Vec<&str> = state.disease_options.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["asthma", "gout"]);
    assert!(!state.disease_options[1].treatable);

    assert_eq!(dashboard.node_color("disease"), PALETTE[0]);
    assert_eq!(dashboard.node_color("gene/protein"), PALETTE[2]);
    assert_eq!(dashboard.node_color("disease"), PALETTE[0]);
}

#[tokio::test]
async fn test_late_predictions_do_not_overwrite_newer_disease() {
    let mut source = FakeSource::default();
    let gate_d1 = source.gated("D1", &["A", "B"]);
    let gate_d2 = source.gated("D2", &["C"]);
    let dashboard = loaded_dashboard(source).await;

    let fetch_d1 = dashboard.select_disease("D1").expect("fetch started");
    let fetch_d2 = dashboard.select_disease("D2").expect("fetch started");
    assert!(dashboard.read(|s| s.drug_predictions.is_loading()));

    gate_d2.notify_one();
    fetch_d2.await.unwrap();
    assert_eq!(dashboard.read(|s| drug_ids(&s.drug_predictions)), vec!["C"]);

    gate_d1.notify_one();
    fetch_d1.await.unwrap();

    let state = dashboard.snapshot();
    assert_eq!(state.selected_disease_id(), Some("D2"));
    assert_eq!(state.drug_predictions.disease_id(), Some("D2"));
    assert_eq!(drug_ids(&state.drug_predictions), vec!["C"]);
}

#[tokio::test]
async fn test_new_disease_never_shows_previous_list() {
    let mut source = FakeSource::default();
    source.ready("D1", &["A", "B"]);
    let _gate_d2 = source.gated("D2", &["C"]);
    let dashboard = loaded_dashboard(source).await;

    dashboard.select_disease("D1").unwrap().await.unwrap();
    assert_eq!(dashboard.read(|s| drug_ids(&s.drug_predictions)), vec!["A", "B"]);

    let _pending = dashboard.select_disease("D2");
    let state = dashboard.snapshot();
    assert!(state.drug_predictions.is_loading());
    assert!(state.drug_predictions.drugs().is_empty());
    assert!(state.is_loading(Resource::DrugPredictions));
}

#[tokio::test]
async fn test_predictions_named_and_ranked() {
    let mut source = FakeSource::default();
    source.ready("D1", &["A", "B"]);
    let dashboard = loaded_dashboard(source).await;

    dashboard.select_disease("D1").unwrap().await.unwrap();
    let state = dashboard.snapshot();
    let drugs = state.drug_predictions.drugs();

    assert_eq!(drugs[0].name, "Aspirin");
    assert!(drugs[0].known);
    assert_eq!(drugs[1].name, "B");
    assert!(drugs[0].score > drugs[1].score);
}

#[tokio::test]
async fn test_missing_predictions_marks_failure() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;

    dashboard.select_disease("D1").unwrap().await.unwrap();
    let state = dashboard.snapshot();

    assert_eq!(state.selected_disease_id(), Some("D1"));
    assert!(matches!(state.drug_predictions, Predictions::Failed { .. }));
    assert!(state.fetch_errors[&Resource::DrugPredictions].contains("HTTP 404"));
}

#[tokio::test]
async fn test_drug_selection_round_trip() {
    let mut source = FakeSource::default();
    source.ready("D1", &["A", "B", "C"]);
    let dashboard = loaded_dashboard(source).await;
    dashboard.select_disease("D1").unwrap().await.unwrap();
    let before = dashboard.snapshot();

    dashboard
        .change_drug_selection(&["C".to_string()])
        .unwrap();
    dashboard
        .change_drug_selection(&["C".to_string(), "A".to_string()])
        .unwrap();
    assert_eq!(dashboard.read(|s| s.selected_drug_ids()), vec!["A", "C"]);

    dashboard.change_drug_selection(&["A".to_string()]).unwrap();
    dashboard.change_drug_selection(&[]).unwrap();
    assert_eq!(dashboard.snapshot(), before);
}

#[tokio::test]
async fn test_ambiguous_selection_is_rejected() {
    let mut source = FakeSource::default();
    source.ready("D1", &["A", "B", "C"]);
    let dashboard = loaded_dashboard(source).await;
    dashboard.select_disease("D1").unwrap().await.unwrap();
    let before = dashboard.snapshot();

    let err = dashboard
        .change_drug_selection(&["A".to_string(), "B".to_string()])
        .unwrap_err();
    assert!(matches!(err, DrugExplorerError::ReconciliationAmbiguity { .. }));
    assert!(dashboard.change_drug_selection(&[]).is_err());
    assert_eq!(dashboard.snapshot(), before);
}

#[tokio::test]
async fn test_drug_selection_requires_disease() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;
    assert!(matches!(
        dashboard.change_drug_selection(&["A".to_string()]),
        Err(DrugExplorerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_threshold_updates() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;
    let mut events = dashboard.subscribe();

    dashboard.change_edge_threshold(1.0);
    dashboard.change_edge_threshold("1.");
    dashboard.change_edge_threshold(None::<f64>);
    dashboard.change_edge_threshold(7.5);

    assert_eq!(dashboard.read(|s| s.edge_threshold), 1.0);
    assert_eq!(
        events.recv().await.unwrap(),
        StateEvent::ThresholdChanged { value: 1.0 }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_attention_filtered_and_stored() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;

    dashboard
        .load_attention(&[Some("id1".to_string()), None, Some("id3".to_string())])
        .await;

    let state = dashboard.snapshot();
    let mut keys: Vec<_> = state.attention.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["id1", "id3"]);
    assert!(!state.is_loading(Resource::Attention));
}

#[tokio::test]
async fn test_attention_failure_keeps_selection() {
    let mut source = FakeSource {
        fail_attention: true,
        ..FakeSource::default()
    };
    source.ready("D1", &["A", "B"]);
    let dashboard = loaded_dashboard(source).await;
    dashboard.select_disease("D1").unwrap().await.unwrap();
    dashboard.change_drug_selection(&["B".to_string()]).unwrap();
    dashboard.change_edge_threshold(0.9);
    let before = dashboard.snapshot();

    dashboard.load_attention(&[Some("id1".to_string())]).await;

    let after = dashboard.snapshot();
    assert_eq!(after.selected_disease, before.selected_disease);
    assert_eq!(after.drug_predictions, before.drug_predictions);
    assert_eq!(after.edge_threshold, 0.9);
    assert!(after.attention.is_empty());
    assert_eq!(after.fetch_errors[&Resource::Attention], "Fetch of attention failed: HTTP 503");
}

#[tokio::test]
async fn test_attention_replaced_on_each_load() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;
    dashboard.load_attention(&[Some("id1".to_string())]).await;
    dashboard.load_attention(&[Some("id2".to_string())]).await;

    let keys: Vec<_> = dashboard.read(|s| s.attention.keys().cloned().collect());
    assert_eq!(keys, vec!["id2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_events_follow_state_order_across_threads() {
    let dashboard = loaded_dashboard(FakeSource::default()).await;
    let mut events = dashboard.subscribe();

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    dashboard.change_edge_threshold(((t * 50 + i) % 150) as f64 / 100.0);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        if let StateEvent::ThresholdChanged { value } = event {
            last = Some(value);
        }
    }
    assert_eq!(last, Some(dashboard.read(|s| s.edge_threshold)));
}

fn attention_keys(dashboard: &Dashboard<FakeSource>) -> Vec<String> {
    dashboard.read(|s| {
        let mut keys: Vec<_> = s.attention.keys().cloned().collect();
        keys.sort();
        keys
    })
}

#[tokio::test]
async fn test_late_attention_does_not_overwrite_newer_request() {
    let mut source = FakeSource::default();
    let gate_older = source.gate_attention("id1");
    let gate_newer = source.gate_attention("id2");
    let dashboard = loaded_dashboard(source).await;

    let older = dashboard
        .request_attention(&[Some("id1".to_string())])
        .expect("fetch started");
    let newer = dashboard
        .request_attention(&[Some("id2".to_string())])
        .expect("fetch started");

    gate_newer.notify_one();
    newer.await.unwrap();
    assert_eq!(attention_keys(&dashboard), vec!["id2"]);
    assert!(!dashboard.read(|s| s.is_loading(Resource::Attention)));

    gate_older.notify_one();
    older.await.unwrap();
    assert_eq!(attention_keys(&dashboard), vec!["id2"]);
    assert!(!dashboard.read(|s| s.is_loading(Resource::Attention)));
}

#[tokio::test]
async fn test_attention_stays_loading_until_newest_request_lands() {
    let mut source = FakeSource::default();
    let gate_older = source.gate_attention("id1");
    let gate_newer = source.gate_attention("id2");
    let dashboard = loaded_dashboard(source).await;

    let older = dashboard
        .request_attention(&[Some("id1".to_string())])
        .expect("fetch started");
    let newer = dashboard
        .request_attention(&[Some("id2".to_string())])
        .expect("fetch started");

    gate_older.notify_one();
    older.await.unwrap();
    assert!(attention_keys(&dashboard).is_empty());
    assert!(dashboard.read(|s| s.is_loading(Resource::Attention)));

    gate_newer.notify_one();
    newer.await.unwrap();
    assert_eq!(attention_keys(&dashboard), vec!["id2"]);
    assert!(!dashboard.read(|s| s.is_loading(Resource::Attention)));
}

#[tokio::test]
async fn test_drug_selection_while_loading_is_reported() {
    let mut source = FakeSource::default();
    let _gate = source.gated("D1", &["A"]);
    let dashboard = loaded_dashboard(source).await;
    let _pending = dashboard.select_disease("D1").unwrap();

    let result = dashboard.change_drug_selection(&["A".to_string()]);
    assert!(matches!(result, Err(DrugExplorerError::InvalidInput(_))));
    assert!(dashboard.read(|s| s.selected_drug_ids().is_empty()));
}

#[tokio::test]
async fn test_drug_selection_returns_applied_change() {
    let mut source = FakeSource::default();
    source.ready("D1", &["A", "B"]);
    let dashboard = loaded_dashboard(source).await;
    dashboard.select_disease("D1").unwrap().await.unwrap();

    let event = dashboard.change_drug_selection(&["B".to_string()]).unwrap();
    assert_eq!(
        event,
        StateEvent::DrugToggled { drug_id: "B".into(), selected: true }
    );
}

#[tokio::test]
async fn test_missing_names_still_loads_diseases() {
    let dashboard = loaded_dashboard(FakeSource {
        fail_node_names: true,
        ..FakeSource::default()
    })
    .await;
    let state = dashboard.snapshot();

    let ids: Vec<&str> = state.disease_options.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(ids, vec!["D1", "D2", "D3"]);
    assert!(state.fetch_errors.contains_key(&Resource::NodeNames));
    assert!(!state.fetch_errors.contains_key(&Resource::DiseaseOptions));
}

#[tokio::test]
async fn test_disease_selection_events() {
    let mut source = FakeSource::default();
    source.ready("D2", &["C"]);
    let dashboard = loaded_dashboard(source).await;
    let mut events = dashboard.subscribe();

    dashboard.select_disease("D2").unwrap().await.unwrap();
    assert!(matches!(
        dashboard.select_disease("unknown"),
        Err(DrugExplorerError::UnknownDisease(id)) if id == "unknown"
    ));

    assert_eq!(
        events.recv().await.unwrap(),
        StateEvent::DiseaseSelected { disease_id: "D2".into() }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        StateEvent::PredictionsChanged { disease_id: "D2".into() }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_http_dashboard_from_config() {
    let mut config = DashboardConfig::default();
    config.selection.default_edge_threshold = 1.1;
    let dashboard = Dashboard::from_config(&config).unwrap();
    assert_eq!(dashboard.read(|s| s.edge_threshold), 1.1);

    config.data.base_url = "::".to_string();
    assert!(matches!(
        Dashboard::from_config(&config),
        Err(DrugExplorerError::Config(_))
    ));
}
