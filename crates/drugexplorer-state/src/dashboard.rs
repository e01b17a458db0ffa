//! The action dispatcher: the single way into [`SelectionState`].
//!
//! Every action goes through [`reduce`] under the state write lock, so
//! actions apply in the order they are dispatched. The lock is never held
//! across an await. Fetches run as independent tokio tasks and report back
//! as actions; the reducer drops the ones that have gone stale.
//!
//! Must be used from within a Tokio runtime.

use std::sync::Arc;

use drugexplorer_common::config::{DashboardConfig, SelectionConfig};
use drugexplorer_common::{DrugExplorerError, Result};
use drugexplorer_data::{build_disease_options, DataSource, HttpDataSource, Resource};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::action::{Action, ControlValue, Effect, Intent, StateEvent};
use crate::color::{Color, ColorCache};
use crate::reconcile::reconcile;
use crate::reducer::reduce;
use crate::state::{unique_in_order, SelectionState};

pub struct Dashboard<S> {
    source: Arc<S>,
    state: Arc<RwLock<SelectionState>>,
    colors: Arc<Mutex<ColorCache>>,
    event_tx: broadcast::Sender<StateEvent>,
    excluded_diseases: Arc<Vec<String>>,
}

impl<S> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            colors: Arc::clone(&self.colors),
            event_tx: self.event_tx.clone(),
            excluded_diseases: Arc::clone(&self.excluded_diseases),
        }
    }
}

impl Dashboard<HttpDataSource> {
    /// Dashboard reading its datasets over HTTP.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpDataSource::new(&config.data)?;
        info!(base_url = %source.base_url(), "Dashboard data source ready");
        Ok(Self::new(source, &config.selection))
    }
}

impl<S: DataSource + 'static> Dashboard<S> {
    pub fn new(source: S, config: &SelectionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            source: Arc::new(source),
            state: Arc::new(RwLock::new(SelectionState::new(config.default_edge_threshold))),
            colors: Arc::new(Mutex::new(ColorCache::new())),
            event_tx,
            excluded_diseases: Arc::new(config.excluded_diseases.clone()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> SelectionState {
        self.state.read().clone()
    }

    /// Read the state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SelectionState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn node_color(&self, node_type: &str) -> Color {
        self.colors.lock().get(node_type)
    }

    /// Apply one action and broadcast what changed. The event is sent under
    /// the write lock so subscribers see events in state order.
    fn apply(&self, action: Action) -> (Option<Effect>, Option<StateEvent>) {
        let mut state = self.state.write();
        let current = std::mem::take(&mut *state);
        let transition = reduce(current, action);
        *state = transition.state;
        if let Some(event) = &transition.event {
            // No subscribers is fine.
            let _ = self.event_tx.send(event.clone());
        }
        (transition.effect, transition.event)
    }

    /// Apply a user intent. Returns the handle of the fetch it started, if any.
    pub fn dispatch(&self, intent: Intent) -> Option<JoinHandle<()>> {
        debug!(?intent, "Dispatching intent");
        let (effect, _) = self.apply(Action::Intent(intent));
        effect.map(|effect| self.spawn(effect))
    }

    fn spawn(&self, effect: Effect) -> JoinHandle<()> {
        tokio::spawn(self.clone().run_effect(effect))
    }

    async fn run_effect(self, effect: Effect) {
        let action = match effect {
            Effect::FetchPredictions { disease_id, request } => {
                match self.source.fetch_drug_predictions(&disease_id).await {
                    Ok(records) => Action::PredictionsLoaded { disease_id, request, records },
                    Err(e) => Action::PredictionsFailed {
                        disease_id,
                        request,
                        reason: e.to_string(),
                    },
                }
            }
            Effect::FetchAttention { node_ids, request } => {
                match self.source.fetch_attention(&node_ids).await {
                    Ok(records) => Action::AttentionLoaded { request, records },
                    Err(e) => Action::AttentionFailed { request, reason: e.to_string() },
                }
            }
        };
        self.apply(action);
    }

    /// Select a disease and start fetching its predictions.
    pub fn select_disease(&self, disease_id: impl Into<String>) -> Result<JoinHandle<()>> {
        let disease_id = disease_id.into();
        self.dispatch(Intent::select_disease(disease_id.clone()))
            .ok_or(DrugExplorerError::UnknownDisease(disease_id))
    }

    /// Feed the full selection reported by the drug multi-select.
    pub fn change_drug_selection(&self, new_selection: &[String]) -> Result<StateEvent> {
        let (disease_id, previous) = self.read(|s| {
            (s.selected_disease_id().map(str::to_string), s.selected_drug_ids())
        });
        let disease_id = disease_id
            .ok_or_else(|| DrugExplorerError::InvalidInput("no disease selected".to_string()))?;

        let change = reconcile(&previous, new_selection)?;
        let drug_id = change.drug_id.clone();
        let (_, event) = self.apply(Action::Intent(Intent::SelectDrug {
            drug_id: change.drug_id,
            disease_id: disease_id.clone(),
            is_add: change.is_add,
        }));
        event.ok_or_else(|| {
            DrugExplorerError::InvalidInput(format!(
                "selection of drug {} for disease {} was not applied",
                drug_id, disease_id
            ))
        })
    }

    pub fn change_edge_threshold(&self, value: impl Into<ControlValue>) {
        self.dispatch(Intent::change_edge_threshold(value));
    }

    /// Fetch the session catalogs concurrently. Each one lands in the state
    /// as soon as it arrives; failures are recorded per dataset.
    pub async fn load_catalogs(&self) {
        for resource in [
            Resource::NodeTypes,
            Resource::EdgeTypes,
            Resource::MetaPaths,
            Resource::DiseaseOptions,
            Resource::NodeNames,
        ] {
            self.apply(Action::FetchStarted(resource));
        }

        tokio::join!(
            self.load_node_types(),
            async {
                let action = match self.source.fetch_edge_types().await {
                    Ok(edge_types) => Action::EdgeTypesLoaded(edge_types),
                    Err(e) => failure(Resource::EdgeTypes, e),
                };
                self.apply(action);
            },
            async {
                let action = match self.source.fetch_meta_paths().await {
                    Ok(meta_paths) => Action::MetaPathsLoaded(meta_paths),
                    Err(e) => failure(Resource::MetaPaths, e),
                };
                self.apply(action);
            },
            self.load_diseases(),
        );

        self.read(|s| {
            info!(
                node_types = s.node_types.len(),
                diseases = s.disease_options.len(),
                failed = s.fetch_errors.len(),
                "Catalogs loaded"
            )
        });
    }

    async fn load_node_types(&self) {
        match self.source.fetch_node_types().await {
            Ok(node_types) => {
                let node_types = unique_in_order(node_types);
                self.colors.lock().initialize(&node_types);
                self.apply(Action::NodeTypesLoaded(node_types));
            }
            Err(e) => {
                self.apply(failure(Resource::NodeTypes, e));
            }
        }
    }

    /// Disease names come from the node-name dictionary; without it the
    /// catalog still loads, named by id.
    async fn load_diseases(&self) {
        let (options, names) = tokio::join!(
            self.source.fetch_disease_options(),
            self.source.fetch_node_names()
        );

        let names = match names {
            Ok(names) => {
                self.apply(Action::NodeNamesLoaded(names.clone()));
                names
            }
            Err(e) => {
                self.apply(failure(Resource::NodeNames, e));
                Default::default()
            }
        };

        let action = match options {
            Ok(options) => Action::DiseaseOptionsLoaded(build_disease_options(
                options,
                &names,
                &self.excluded_diseases,
            )),
            Err(e) => failure(Resource::DiseaseOptions, e),
        };
        self.apply(action);
    }

    /// Start fetching attention payloads for the given nodes. The newest
    /// request wins; earlier ones still in flight are dropped when they land.
    pub fn request_attention(&self, node_ids: &[Option<String>]) -> Option<JoinHandle<()>> {
        let (effect, _) = self.apply(Action::LoadAttention { node_ids: node_ids.to_vec() });
        effect.map(|effect| self.spawn(effect))
    }

    /// Fetch attention payloads for the given nodes, replacing the previous set.
    pub async fn load_attention(&self, node_ids: &[Option<String>]) {
        if let Some(fetch) = self.request_attention(node_ids) {
            if let Err(e) = fetch.await {
                warn!(error = %e, "Attention fetch task failed");
            }
        }
    }
}

fn failure(resource: Resource, error: DrugExplorerError) -> Action {
    Action::FetchFailed {
        resource,
        reason: error.to_string(),
    }
}
