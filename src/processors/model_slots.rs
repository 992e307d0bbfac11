use std::collections::BTreeMap;

use crate::models::WeatherTable;
use crate::processors::stage::{Stage, StageContext, StageOutput};
use crate::utils::constants::{
    DOWNSCALER_LAT_MODULUS, DOWNSCALER_SCALE, FIELD_PRECIPITATION, FIELD_TEMPERATURE,
    GRAPHCAST_PRECIP_FACTOR, GRAPHCAST_TEMP_WINDOW, SLOT_MOCK_DOWNSCALER, SLOT_MOCK_GRAPHCAST,
    SLOT_NONE,
};
use crate::utils::stats::round_to;

/// Built-in placeholder models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSlot {
    Identity,
    MockGraphcast,
    MockDownscaler,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 3] = [
        ModelSlot::Identity,
        ModelSlot::MockGraphcast,
        ModelSlot::MockDownscaler,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SLOT_NONE => Some(ModelSlot::Identity),
            SLOT_MOCK_GRAPHCAST => Some(ModelSlot::MockGraphcast),
            SLOT_MOCK_DOWNSCALER => Some(ModelSlot::MockDownscaler),
            _ => None,
        }
    }

    pub fn slot_name(&self) -> &'static str {
        match self {
            ModelSlot::Identity => SLOT_NONE,
            ModelSlot::MockGraphcast => SLOT_MOCK_GRAPHCAST,
            ModelSlot::MockDownscaler => SLOT_MOCK_DOWNSCALER,
        }
    }
}

impl Stage for ModelSlot {
    fn name(&self) -> &str {
        self.slot_name()
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        match self {
            ModelSlot::Identity => StageOutput::unchanged(table),
            ModelSlot::MockGraphcast => {
                let adjusted = table
                    .map_values(FIELD_PRECIPITATION, |v| {
                        round_to(v * GRAPHCAST_PRECIP_FACTOR, 2)
                    })
                    .rolling_mean_trailing(FIELD_TEMPERATURE, GRAPHCAST_TEMP_WINDOW)
                    .map_values(FIELD_TEMPERATURE, |v| round_to(v, 2));

                StageOutput::new(adjusted, Vec::new()).with_note(format!(
                    "slot={}: simulated refinement of the precipitation and temperature fields.",
                    SLOT_MOCK_GRAPHCAST
                ))
            }
            ModelSlot::MockDownscaler => {
                let correction = downscaler_correction(context.latitude);
                let adjusted =
                    table.map_values(FIELD_TEMPERATURE, |v| round_to(v - correction, 2));

                StageOutput::new(adjusted, Vec::new()).with_note(format!(
                    "slot={}: local temperature correction of {:.2} °C (lat={:.2}).",
                    SLOT_MOCK_DOWNSCALER, correction, context.latitude
                ))
            }
        }
    }
}

/// Latitude-dependent correction of the mock downscaler, 0.0 to 0.5 °C
pub fn downscaler_correction(latitude: f64) -> f64 {
    (latitude.abs() % DOWNSCALER_LAT_MODULUS) * DOWNSCALER_SCALE
}

/// Stand-in for a slot name nobody registered: identity plus a note saying so
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSlot {
    pub requested: String,
}

impl Stage for UnknownSlot {
    fn name(&self) -> &str {
        &self.requested
    }

    fn apply(&self, table: &WeatherTable, _context: &StageContext) -> StageOutput {
        StageOutput::unchanged(table).with_note(format!(
            "slot={}: unknown model slot, data unchanged.",
            self.requested
        ))
    }
}

/// A name resolved against the registry
pub enum ResolvedSlot<'a> {
    Registered(&'a dyn Stage),
    Unknown(UnknownSlot),
}

impl Stage for ResolvedSlot<'_> {
    fn name(&self) -> &str {
        match self {
            ResolvedSlot::Registered(stage) => stage.name(),
            ResolvedSlot::Unknown(unknown) => unknown.name(),
        }
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        match self {
            ResolvedSlot::Registered(stage) => stage.apply(table, context),
            ResolvedSlot::Unknown(unknown) => unknown.apply(table, context),
        }
    }
}

/// Named model transforms selected at runtime
pub struct ModelSlotRegistry {
    slots: BTreeMap<String, Box<dyn Stage>>,
}

impl ModelSlotRegistry {
    /// Registry without any slots
    pub fn empty() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Registry holding the identity slot and the two placeholders
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for slot in ModelSlot::ALL {
            registry.register(slot.slot_name(), slot);
        }
        registry
    }

    /// Add or replace a slot
    pub fn register(&mut self, name: &str, stage: impl Stage + 'static) {
        if self.slots.insert(name.to_string(), Box::new(stage)).is_some() {
            tracing::debug!(slot = name, "Replaced model slot");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.keys().map(String::as_str).collect()
    }

    pub fn resolve(&self, name: &str) -> ResolvedSlot<'_> {
        match self.slots.get(name) {
            Some(stage) => ResolvedSlot::Registered(stage.as_ref()),
            None => ResolvedSlot::Unknown(UnknownSlot {
                requested: name.to_string(),
            }),
        }
    }

    /// Run the named slot; unknown names pass the table through with a note
    pub fn apply(&self, table: &WeatherTable, slot_name: &str, lat: f64, lon: f64) -> StageOutput {
        let resolved = self.resolve(slot_name);
        if matches!(resolved, ResolvedSlot::Unknown(_)) {
            tracing::warn!(slot = slot_name, "Unknown model slot requested");
        }

        let output = resolved.apply(table, &StageContext::new(lat, lon));
        tracing::debug!(slot = slot_name, notes = output.notes.len(), "Model slot applied");
        output
    }
}

impl Default for ModelSlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}
