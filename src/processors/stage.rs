use crate::models::{CorrectionNote, WeatherTable};

/// Location a stage runs for
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageContext {
    pub latitude: f64,
    pub longitude: f64,
}

impl StageContext {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A transformed table together with the notes describing the transform
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageOutput {
    pub table: WeatherTable,
    pub notes: Vec<CorrectionNote>,
}

impl StageOutput {
    pub fn new(table: WeatherTable, notes: Vec<CorrectionNote>) -> Self {
        Self { table, notes }
    }

    /// Table passed through without notes
    pub fn unchanged(table: &WeatherTable) -> Self {
        Self::new(table.clone(), Vec::new())
    }

    pub fn with_note(mut self, note: impl Into<CorrectionNote>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Pure transform shared by model slots and corrections.
///
/// Implementations never mutate their input and never fail: data a stage cannot
/// handle is passed through, optionally with a note saying so.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput;
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        (**self).apply(table, context)
    }
}

/// Adapts a plain function or closure to [`Stage`]
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(&WeatherTable, &StageContext) -> StageOutput + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&WeatherTable, &StageContext) -> StageOutput + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        (self.f)(table, context)
    }
}

/// Ordered stages; each one sees the previous stage's output and notes concatenate
#[derive(Default)]
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Stage for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, table: &WeatherTable, context: &StageContext) -> StageOutput {
        let mut current = StageOutput::unchanged(table);

        for stage in &self.stages {
            let output = stage.apply(&current.table, context);
            tracing::debug!(
                pipeline = %self.name,
                stage = stage.name(),
                notes = output.notes.len(),
                "Stage applied"
            );
            current.table = output.table;
            current.notes.extend(output.notes);
        }

        current
    }
}
