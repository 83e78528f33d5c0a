use shared::{ConfidenceBucket, Prediction, RankedPrediction, TopSummary};

/// Rank is the 1-based received position; the client never re-sorts.
pub fn rank(predictions: &[Prediction]) -> Vec<RankedPrediction> {
    predictions
        .iter()
        .enumerate()
        .map(|(index, prediction)| RankedPrediction {
            rank: index + 1,
            label: prediction.label.clone(),
            display_label: display_label(&prediction.label),
            confidence: prediction.confidence,
            bucket: ConfidenceBucket::from_confidence(prediction.confidence),
        })
        .collect()
}

pub fn top_summary(predictions: &[Prediction]) -> Option<TopSummary> {
    predictions.first().map(|top| TopSummary {
        label: top.label.clone(),
        display_label: display_label(&top.label),
        confidence: top.confidence,
        bucket: ConfidenceBucket::from_confidence(top.confidence),
    })
}

/// Display-only transform; the raw label stays the canonical
/// identifier.
pub fn display_label(raw: &str) -> String {
    raw.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_headline(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn format_row(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}
