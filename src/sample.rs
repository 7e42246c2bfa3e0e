//! Sample and feature value objects shared by the scoring engines
//!
//! A [`Sample`] is one input row: a string identifier plus a list of named
//! numeric features. Samples are created once per row and never mutated after
//! being handed to a scorer. Feature insertion order is irrelevant for
//! scoring (scorers resolve features by name) and only matters for display.

/// A single named numeric feature, owned by its sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    name: String,
    value: f64,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// One input row: an identifier plus its named features.
#[derive(Debug, Clone)]
pub struct Sample {
    id: String,
    features: Vec<Feature>,
}

impl Sample {
    /// Create an empty sample with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            features: Vec::new(),
        }
    }

    /// Create a sample with its full feature list.
    pub fn with_features(id: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            id: id.into(),
            features,
        }
    }

    /// Append a feature during construction.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Look up a feature value by name.
    pub fn feature_value(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|f| f.name() == name)
            .map(Feature::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_construction() {
        let mut sample = Sample::new("sample_42");
        sample.add_feature(Feature::new("mean", 1.5));
        sample.add_feature(Feature::new("var", 0.25));

        assert_eq!(sample.id(), "sample_42");
        assert_eq!(sample.features().len(), 2);
    }

    #[test]
    fn test_feature_lookup_by_name() {
        let sample = Sample::with_features(
            "s1",
            vec![Feature::new("mean", 1.5), Feature::new("kurtosis", -0.3)],
        );

        assert_eq!(sample.feature_value("kurtosis"), Some(-0.3));
        assert_eq!(sample.feature_value("mean"), Some(1.5));
    }

    #[test]
    fn test_missing_feature_is_none() {
        let sample = Sample::with_features("s1", vec![Feature::new("mean", 1.5)]);
        assert_eq!(sample.feature_value("skew"), None);
    }
}
