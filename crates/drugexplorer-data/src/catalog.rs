//! Assembly of typed catalogs from the raw datasets.

use drugexplorer_common::entities::{
    AttentionRecord, Disease, DiseaseOption, DrugPrediction, DrugPredictionRecord, NodeNameDict,
};
use tracing::debug;

/// Node-name dictionary keys.
pub const DISEASE_NODE_TYPE: &str = "disease";
pub const DRUG_NODE_TYPE: &str = "drug";

fn node_name(names: &NodeNameDict, node_type: &str, id: &str) -> String {
    names
        .get(node_type)
        .and_then(|m| m.get(id))
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

/// Join disease ids to their names, keeping catalog order.
/// Diseases whose name is in `excluded` (case-insensitive) are dropped.
/// Ids missing from the name dictionary are named by their id.
pub fn build_disease_options(
    options: Vec<DiseaseOption>,
    names: &NodeNameDict,
    excluded: &[String],
) -> Vec<Disease> {
    let total = options.len();
    let diseases: Vec<Disease> = options
        .into_iter()
        .map(|DiseaseOption(id, treatable)| Disease {
            name: node_name(names, DISEASE_NODE_TYPE, &id),
            id,
            treatable,
        })
        .filter(|d| !excluded.iter().any(|x| x.eq_ignore_ascii_case(&d.name)))
        .collect();
    debug!(total, kept = diseases.len(), "Disease catalog built");
    diseases
}

/// Name the drugs of a prediction list. Rank order is preserved and
/// nothing starts out selected.
pub fn build_predictions(records: Vec<DrugPredictionRecord>, names: &NodeNameDict) -> Vec<DrugPrediction> {
    records
        .into_iter()
        .map(|r| DrugPrediction {
            name: node_name(names, DRUG_NODE_TYPE, &r.id),
            id: r.id,
            score: r.score,
            known: r.known,
            selected: false,
        })
        .collect()
}

/// Keep only the requested ids. `None` ids and ids absent from the dataset are skipped.
pub fn filter_attention(mut dataset: AttentionRecord, node_ids: &[Option<String>]) -> AttentionRecord {
    let mut records = AttentionRecord::with_capacity(node_ids.len());
    for id in node_ids.iter().flatten() {
        if let Some(payload) = dataset.remove(id) {
            records.insert(id.clone(), payload);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn names() -> NodeNameDict {
        let mut dict = NodeNameDict::new();
        dict.insert(
            "disease".into(),
            HashMap::from([
                ("1".to_string(), "asthma".to_string()),
                ("2".to_string(), "cancer".to_string()),
                ("3".to_string(), "gout".to_string()),
            ]),
        );
        dict.insert(
            "drug".into(),
            HashMap::from([("DB01".to_string(), "Colchicine".to_string())]),
        );
        dict
    }

    #[test]
    fn test_disease_options_named_and_filtered() {
        let options = vec![
            DiseaseOption("1".into(), true),
            DiseaseOption("2".into(), true),
            DiseaseOption("3".into(), false),
            DiseaseOption("4".into(), false),
        ];
        let diseases = build_disease_options(options, &names(), &["Cancer".to_string()]);
        let ids: Vec<&str> = diseases.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
        assert_eq!(diseases[1].name, "gout");
        assert!(!diseases[1].treatable);
        assert_eq!(diseases[2].name, "4");
    }

    #[test]
    fn test_predictions_keep_rank_order() {
        let records = vec![
            DrugPredictionRecord { id: "DB02".into(), score: 3.0, known: false },
            DrugPredictionRecord { id: "DB01".into(), score: 2.0, known: true },
        ];
        let drugs = build_predictions(records, &names());
        assert_eq!(drugs[0].id, "DB02");
        assert_eq!(drugs[0].name, "DB02");
        assert_eq!(drugs[1].name, "Colchicine");
        assert!(drugs[1].known);
        assert!(drugs.iter().all(|d| !d.selected));
    }

    #[test]
    fn test_attention_filtered_to_requested_ids() {
        let dataset: AttentionRecord = HashMap::from([
            ("id1".to_string(), json!({"w": 1})),
            ("id2".to_string(), json!({"w": 2})),
            ("id3".to_string(), json!({"w": 3})),
        ]);
        let ids = vec![Some("id1".to_string()), None, Some("id3".to_string()), Some("id9".to_string())];
        let records = filter_attention(dataset, &ids);

        let mut keys: Vec<&String> = records.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["id1", "id3"]);
        assert_eq!(records["id3"], json!({"w": 3}));
    }
}
