//! Validated Hazard Set

use crate::{Hazard, ValidationError};
use std::collections::HashSet;
use tracing::{debug, info};

/// Immutable, fully validated collection of hazards in load order.
///
/// The only way to obtain a non-empty set is [`HazardSet::new`], so a set
/// in hand never contains a hazard that failed validation.
#[derive(Debug, Clone, Default)]
pub struct HazardSet {
    hazards: Vec<Hazard>,
}

impl HazardSet {
    /// Validate every hazard and build the set, or reject it whole
    pub fn new(hazards: Vec<Hazard>) -> Result<Self, ValidationError> {
        {
            let mut seen = HashSet::with_capacity(hazards.len());
            for hazard in &hazards {
                hazard.validate()?;
                if !seen.insert(hazard.id()) {
                    debug!("Rejecting hazard set: duplicate id {}", hazard.id());
                    return Err(ValidationError::DuplicateId(hazard.id().to_string()));
                }
            }
        }

        info!("Validated hazard set with {} hazards", hazards.len());
        Ok(Self { hazards })
    }

    /// Set with no hazards
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hazard> {
        self.hazards.iter()
    }

    /// Look up a hazard by id
    pub fn get(&self, id: &str) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id() == id)
    }

    /// Number of point and line hazards
    pub fn counts(&self) -> (usize, usize) {
        let points = self
            .hazards
            .iter()
            .filter(|h| matches!(h, Hazard::Point(_)))
            .count();
        (points, self.hazards.len() - points)
    }
}

impl<'a> IntoIterator for &'a HazardSet {
    type Item = &'a Hazard;
    type IntoIter = std::slice::Iter<'a, Hazard>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineHazard, PointHazard};
    use geodesy::Coordinate;

    fn point(id: &str) -> Hazard {
        PointHazard {
            id: id.to_string(),
            location: Coordinate::new(22.282, 114.158),
            road_bearing: 90.0,
            speed_limit: Some(50.0),
            remarks: String::new(),
        }
        .into()
    }

    fn line(id: &str, vertices: usize) -> Hazard {
        LineHazard {
            id: id.to_string(),
            vertices: (0..vertices)
                .map(|i| Coordinate::new(22.30 + i as f64 * 0.001, 114.17))
                .collect(),
            road_bearing: 0.0,
            speed_limit: Some(70.0),
            remarks: String::new(),
        }
        .into()
    }

    #[test]
    fn test_build_set() {
        let set = HazardSet::new(vec![point("C1"), line("L1", 3), point("C2")]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.counts(), (2, 1));
        assert_eq!(set.get("L1").map(|h| h.id()), Some("L1"));
        assert!(set.get("missing").is_none());

        let ids: Vec<_> = set.iter().map(|h| h.id()).collect();
        assert_eq!(ids, ["C1", "L1", "C2"]);
    }

    #[test]
    fn test_rejects_whole_set_on_one_bad_hazard() {
        let result = HazardSet::new(vec![point("C1"), line("L1", 1)]);
        assert!(matches!(result, Err(ValidationError::Hazard { ref id, .. }) if id == "L1"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = HazardSet::new(vec![point("C1"), point("C1")]);
        assert_eq!(result.unwrap_err(), ValidationError::DuplicateId("C1".into()));
    }

    #[test]
    fn test_empty_set() {
        let set = HazardSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.counts(), (0, 0));
    }
}
