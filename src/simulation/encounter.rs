use std::fmt;

use bevy_ecs::prelude::*;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterKind {
    AgentTrace,
    AgentAmbush,
    FieldMedic,
    FreeCivilian,
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EncounterKind::AgentTrace => "agent trace",
            EncounterKind::AgentAmbush => "agent ambush",
            EncounterKind::FieldMedic => "field medic",
            EncounterKind::FreeCivilian => "free civilian",
        };
        f.write_str(label)
    }
}

/// Half-open probability band `[start, end)` mapped to an encounter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterBand {
    pub start: f64,
    pub end: f64,
    pub kind: EncounterKind,
}

impl EncounterBand {
    pub const fn new(start: f64, end: f64, kind: EncounterKind) -> Self {
        Self { start, end, kind }
    }

    pub fn contains(&self, roll: f64) -> bool {
        roll >= self.start && roll < self.end
    }
}

pub const DEFAULT_BANDS: [EncounterBand; 4] = [
    EncounterBand::new(0.00, 0.15, EncounterKind::AgentTrace),
    EncounterBand::new(0.15, 0.30, EncounterKind::AgentAmbush),
    EncounterBand::new(0.30, 0.40, EncounterKind::FieldMedic),
    EncounterBand::new(0.40, 0.45, EncounterKind::FreeCivilian),
];

/// Ordered, non-overlapping bands. Rolls outside every band are quiet cycles.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EncounterTable {
    bands: Vec<EncounterBand>,
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS.to_vec(),
        }
    }
}

impl EncounterTable {
    pub fn new(mut bands: Vec<EncounterBand>) -> Result<Self, ConfigError> {
        bands.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut previous_end = 0.0;
        for band in &bands {
            if !(band.start >= 0.0 && band.start < band.end && band.end <= 1.0) {
                return Err(ConfigError::BandOutOfRange {
                    start: band.start,
                    end: band.end,
                });
            }
            if band.start < previous_end {
                return Err(ConfigError::BandOverlap {
                    start: band.start,
                    previous_end,
                });
            }
            previous_end = band.end;
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[EncounterBand] {
        &self.bands
    }

    /// First matching band wins.
    pub fn classify(&self, roll: f64) -> Option<EncounterKind> {
        self.bands
            .iter()
            .find(|band| band.contains(roll))
            .map(|band| band.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_classify_at_their_edges() {
        let table = EncounterTable::default();
        assert_eq!(table.classify(0.0), Some(EncounterKind::AgentTrace));
        assert_eq!(table.classify(0.149), Some(EncounterKind::AgentTrace));
        assert_eq!(table.classify(0.15), Some(EncounterKind::AgentAmbush));
        assert_eq!(table.classify(0.30), Some(EncounterKind::FieldMedic));
        assert_eq!(table.classify(0.40), Some(EncounterKind::FreeCivilian));
        assert_eq!(table.classify(0.449), Some(EncounterKind::FreeCivilian));
        assert_eq!(table.classify(0.45), None);
        assert_eq!(table.classify(0.99), None);
    }

    #[test]
    fn overlapping_bands_are_rejected() {
        let result = EncounterTable::new(vec![
            EncounterBand::new(0.0, 0.2, EncounterKind::AgentTrace),
            EncounterBand::new(0.1, 0.3, EncounterKind::AgentAmbush),
        ]);
        assert!(matches!(result, Err(ConfigError::BandOverlap { .. })));
    }

    #[test]
    fn empty_or_out_of_range_bands_are_rejected() {
        let empty = EncounterTable::new(vec![EncounterBand::new(
            0.3,
            0.3,
            EncounterKind::FieldMedic,
        )]);
        assert!(matches!(empty, Err(ConfigError::BandOutOfRange { .. })));
        let beyond = EncounterTable::new(vec![EncounterBand::new(
            0.9,
            1.2,
            EncounterKind::FieldMedic,
        )]);
        assert!(matches!(beyond, Err(ConfigError::BandOutOfRange { .. })));
    }

    #[test]
    fn unsorted_input_is_ordered() {
        let table = EncounterTable::new(vec![
            EncounterBand::new(0.5, 0.6, EncounterKind::FieldMedic),
            EncounterBand::new(0.0, 0.1, EncounterKind::AgentTrace),
        ])
        .unwrap();
        assert_eq!(table.bands()[0].kind, EncounterKind::AgentTrace);
        assert_eq!(table.classify(0.55), Some(EncounterKind::FieldMedic));
        assert_eq!(table.classify(0.2), None);
    }
}
