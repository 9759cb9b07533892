//! The fixed dummy features served by the stub.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DummyFeature {
    pub unique_id: &'static str,
    pub start: u64,
    pub end: u64,
    pub name: &'static str,
    pub note: &'static str,
    pub strand: i8,
    #[serde(rename = "type")]
    pub feature_type: &'static str,
}

const fn gene(
    unique_id: &'static str,
    start: u64,
    end: u64,
    name: &'static str,
    note: &'static str,
    strand: i8,
) -> DummyFeature {
    DummyFeature {
        unique_id,
        start,
        end,
        name,
        note,
        strand,
        feature_type: "gene",
    }
}

const FEATURES: [DummyFeature; 5] = [
    gene("gene001", 10000, 20000, "GENE1", "Dummy gene 1 for testing", 1),
    gene("gene002", 25000, 35000, "GENE2", "Dummy gene 2 for testing", -1),
    gene("gene003", 40000, 50000, "GENE3", "Dummy gene 3 for testing", 1),
    gene("gene004", 55000, 65000, "GENE4", "Dummy gene 4 for testing", -1),
    gene("gene005", 70000, 80000, "GENE5", "Dummy gene 5 for testing", 1),
];

pub fn dummy_features() -> &'static [DummyFeature] {
    &FEATURES
}

impl DummyFeature {
    /// Inside `[start, end]` or overlapping it.
    pub fn intersects(&self, start: u64, end: u64) -> bool {
        let contained = self.start >= start && self.end <= end;
        let overlaps = self.start < end && self.end > start;
        contained || overlaps
    }
}

/// Features in the requested range. The reference name is not used for
/// filtering; every reference carries the same features.
pub fn features_in_range(start: u64, end: u64) -> Vec<&'static DummyFeature> {
    FEATURES.iter().filter(|f| f.intersects(start, end)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(features: Vec<&DummyFeature>) -> Vec<&'static str> {
        features.into_iter().map(|f| f.unique_id).collect()
    }

    #[test]
    fn test_range_filter() {
        assert_eq!(ids(features_in_range(0, 1_000_000)).len(), 5);
        assert_eq!(ids(features_in_range(0, 100000)).len(), 5);
        assert_eq!(ids(features_in_range(15000, 30000)), vec!["gene001", "gene002"]);
        assert_eq!(ids(features_in_range(40000, 50000)), vec!["gene003"]);
        assert!(features_in_range(20000, 25000).is_empty());
        assert!(features_in_range(90000, 100000).is_empty());
    }
}
