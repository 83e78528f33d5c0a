use shared::RankedPrediction;

/// Uses the raw uploaded file name, not the display transform.
pub fn file_name(uploaded_name: &str) -> String {
    format!("predictions_{}.json", uploaded_name)
}

pub fn to_json(ranked: &[RankedPrediction]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ConfidenceBucket, Prediction};

    use crate::results::ranking;

    #[test]
    fn export_name_keeps_the_raw_file_name() {
        assert_eq!(file_name("dog photo.png"), "predictions_dog photo.png.json");
    }

    #[test]
    fn exported_json_carries_raw_labels() {
        let ranked = ranking::rank(&[Prediction::new("golden_retriever".to_string(), 0.91)]);
        let json = to_json(&ranked).unwrap();
        assert!(json.contains("\"golden_retriever\""));

        let parsed: Vec<RankedPrediction> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].label, "golden_retriever");
        assert_eq!(parsed[0].bucket, ConfidenceBucket::High);
    }
}
