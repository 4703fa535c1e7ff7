// Processing module for the assessment cleaning pipeline
// Author: Gabriel Demetrios Lafis

mod assessment;
mod deed;
mod filter;
mod projection;
mod stats;
mod transform;

pub use assessment::*;
pub use deed::*;
pub use filter::*;
pub use projection::*;
pub use stats::*;
pub use transform::*;

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::data::{DataError, DataSet};

/// Represents a data processor that transforms data
pub trait DataProcessor {
    /// Process a dataset and return a new dataset
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError>;

    /// Get the processor name
    fn name(&self) -> &str;
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Parse error in row '{row}': {message}")]
    Parse { row: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Attach the name of the stage that produced this error
    pub fn in_stage(self, stage: &str) -> Self {
        ProcessingError::Stage {
            stage: stage.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any stage wrappers
    pub fn root(&self) -> &ProcessingError {
        match self {
            ProcessingError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the outermost failing stage, if known
    pub fn stage(&self) -> Option<&str> {
        match self {
            ProcessingError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(
            self.root(),
            ProcessingError::Parse { .. } | ProcessingError::Data(DataError::Parse(_))
        )
    }

    pub fn is_schema(&self) -> bool {
        matches!(self.root(), ProcessingError::Data(DataError::Schema(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), ProcessingError::Data(DataError::NotFound(_)))
    }
}

/// Row counts observed around one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
}

/// Pipeline for chaining multiple processors
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn DataProcessor>>,
}

impl Pipeline {
    /// Create a new pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: Vec::new(),
        }
    }

    /// Add a processor to the pipeline
    pub fn add<P: DataProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Names of the stages, in execution order
    pub fn stages(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Execute the pipeline on a dataset
    pub fn execute(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        self.execute_with_report(input).map(|(data, _)| data)
    }

    /// Execute the pipeline, recording row counts per stage.
    ///
    /// The first failing stage aborts the run; its error is wrapped with the
    /// stage name.
    pub fn execute_with_report(
        &self,
        input: &DataSet,
    ) -> Result<(DataSet, Vec<StageReport>), ProcessingError> {
        let mut current = input.clone();
        let mut reports = Vec::with_capacity(self.processors.len());

        for processor in &self.processors {
            let rows_in = current.len();
            current = processor
                .process(&current)
                .map_err(|e| e.in_stage(processor.name()))?;

            debug!(
                "[{}] {}: {} -> {} rows",
                self.name,
                processor.name(),
                rows_in,
                current.len()
            );

            reports.push(StageReport {
                stage: processor.name().to_string(),
                rows_in,
                rows_out: current.len(),
            });
        }

        info!("[{}] finished with {} rows", self.name, current.len());
        Ok((current, reports))
    }
}

impl DataProcessor for Pipeline {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        self.execute(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
