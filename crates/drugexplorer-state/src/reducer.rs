//! State transitions: `(state, action) -> (state, effect, event)`.
//!
//! `reduce` is pure apart from logging. Actions that do not apply
//! (stale fetch results, intents for another disease, non-numeric
//! threshold input) leave the state untouched and produce no event.

use drugexplorer_common::config::{EDGE_THRESHOLD_MAX, EDGE_THRESHOLD_MIN};
use drugexplorer_data::{build_predictions, Resource};
use tracing::{debug, info, warn};

use crate::action::{Action, ControlValue, Effect, Intent, StateEvent};
use crate::state::{unique_in_order, Predictions, SelectionState};

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SelectionState,
    pub effect: Option<Effect>,
    pub event: Option<StateEvent>,
}

impl Transition {
    fn unchanged(state: SelectionState) -> Self {
        Self { state, effect: None, event: None }
    }

    fn changed(state: SelectionState, event: StateEvent) -> Self {
        Self { state, effect: None, event: Some(event) }
    }
}

pub fn reduce(state: SelectionState, action: Action) -> Transition {
    match action {
        Action::Intent(intent) => reduce_intent(state, intent),
        Action::FetchStarted(resource) => {
            let mut state = state;
            state.pending.insert(resource);
            Transition::changed(state, StateEvent::Loading { resource })
        }
        Action::NodeTypesLoaded(node_types) => {
            let mut state = state;
            state.node_types = unique_in_order(node_types);
            loaded(state, Resource::NodeTypes)
        }
        Action::EdgeTypesLoaded(edge_types) => {
            let mut state = state;
            state.edge_types = edge_types;
            loaded(state, Resource::EdgeTypes)
        }
        Action::MetaPathsLoaded(meta_paths) => {
            let mut state = state;
            state.meta_paths = meta_paths;
            loaded(state, Resource::MetaPaths)
        }
        Action::NodeNamesLoaded(names) => {
            let mut state = state;
            state.node_names = names;
            loaded(state, Resource::NodeNames)
        }
        Action::DiseaseOptionsLoaded(diseases) => {
            let mut state = state;
            state.disease_options = diseases;
            loaded(state, Resource::DiseaseOptions)
        }
        Action::LoadAttention { node_ids } => {
            let mut state = state;
            let request = state.next_request();
            state.attention_request = Some(request);
            state.pending.insert(Resource::Attention);
            Transition {
                state,
                effect: Some(Effect::FetchAttention { node_ids, request }),
                event: Some(StateEvent::Loading { resource: Resource::Attention }),
            }
        }
        Action::AttentionLoaded { request, records } => {
            if state.attention_request != Some(request) {
                debug!(%request, "Discarding superseded attention records");
                return Transition::unchanged(state);
            }
            let mut state = state;
            state.attention_request = None;
            state.attention = records;
            loaded(state, Resource::Attention)
        }
        Action::AttentionFailed { request, reason } => {
            if state.attention_request != Some(request) {
                debug!(%request, "Discarding superseded attention failure");
                return Transition::unchanged(state);
            }
            let mut state = state;
            state.attention_request = None;
            warn!(%reason, "Attention unavailable");
            failed(state, Resource::Attention, reason)
        }
        Action::PredictionsLoaded { disease_id, request, records } => {
            if !state.drug_predictions.awaits(&disease_id, request) {
                debug!(%disease_id, %request, "Discarding stale drug predictions");
                return Transition::unchanged(state);
            }
            let mut state = state;
            let drugs = build_predictions(records, &state.node_names);
            info!(%disease_id, count = drugs.len(), "Drug predictions loaded");
            state.drug_predictions = Predictions::Ready {
                disease_id: disease_id.clone(),
                request,
                drugs,
            };
            state.pending.remove(&Resource::DrugPredictions);
            state.fetch_errors.remove(&Resource::DrugPredictions);
            Transition::changed(state, StateEvent::PredictionsChanged { disease_id })
        }
        Action::PredictionsFailed { disease_id, request, reason } => {
            if !state.drug_predictions.awaits(&disease_id, request) {
                debug!(%disease_id, %request, "Discarding stale predictions failure");
                return Transition::unchanged(state);
            }
            let mut state = state;
            warn!(%disease_id, %reason, "Drug predictions unavailable");
            state.drug_predictions = Predictions::Failed {
                disease_id,
                request,
                reason: reason.clone(),
            };
            failed(state, Resource::DrugPredictions, reason)
        }
        Action::FetchFailed { resource, reason } => {
            warn!(%resource, %reason, "Dataset unavailable");
            failed(state, resource, reason)
        }
    }
}

fn loaded(mut state: SelectionState, resource: Resource) -> Transition {
    state.pending.remove(&resource);
    state.fetch_errors.remove(&resource);
    Transition::changed(state, StateEvent::Loaded { resource })
}

fn failed(mut state: SelectionState, resource: Resource, reason: String) -> Transition {
    state.pending.remove(&resource);
    state.fetch_errors.insert(resource, reason.clone());
    Transition::changed(state, StateEvent::FetchFailed { resource, reason })
}

fn reduce_intent(mut state: SelectionState, intent: Intent) -> Transition {
    match intent {
        Intent::SelectDisease { disease_id } => {
            let Some(disease) = state.find_disease(&disease_id).cloned() else {
                warn!(%disease_id, "Ignoring selection of unknown disease");
                return Transition::unchanged(state);
            };
            let request = state.next_request();
            info!(%disease_id, name = %disease.name, %request, "Disease selected");

            state.selected_disease = Some(disease);
            state.drug_predictions = Predictions::Loading {
                disease_id: disease_id.clone(),
                request,
            };
            state.pending.insert(Resource::DrugPredictions);
            state.fetch_errors.remove(&Resource::DrugPredictions);

            Transition {
                state,
                effect: Some(Effect::FetchPredictions {
                    disease_id: disease_id.clone(),
                    request,
                }),
                event: Some(StateEvent::DiseaseSelected { disease_id }),
            }
        }
        Intent::SelectDrug { drug_id, disease_id, is_add } => {
            if state.selected_disease_id() != Some(disease_id.as_str()) {
                debug!(%drug_id, %disease_id, "Ignoring drug selection for a disease no longer selected");
                return Transition::unchanged(state);
            }
            let Predictions::Ready { drugs, .. } = &mut state.drug_predictions else {
                debug!(%drug_id, "Ignoring drug selection while predictions are not loaded");
                return Transition::unchanged(state);
            };
            let Some(drug) = drugs.iter_mut().find(|d| d.id == drug_id) else {
                warn!(%drug_id, %disease_id, "Ignoring selection of unknown drug");
                return Transition::unchanged(state);
            };
            if drug.selected == is_add {
                return Transition::unchanged(state);
            }
            drug.selected = is_add;
            debug!(%drug_id, selected = is_add, "Drug selection toggled");
            Transition::changed(state, StateEvent::DrugToggled { drug_id, selected: is_add })
        }
        Intent::ChangeEdgeThreshold { value } => match valid_threshold(&value) {
            Some(v) => {
                state.edge_threshold = v;
                Transition::changed(state, StateEvent::ThresholdChanged { value: v })
            }
            None => {
                debug!(?value, "Ignoring edge threshold input");
                Transition::unchanged(state)
            }
        },
    }
}

/// Only finite numbers inside the slider range are accepted; nothing is clamped.
fn valid_threshold(value: &ControlValue) -> Option<f64> {
    value
        .as_number()
        .filter(|v| v.is_finite() && (EDGE_THRESHOLD_MIN..=EDGE_THRESHOLD_MAX).contains(v))
}
