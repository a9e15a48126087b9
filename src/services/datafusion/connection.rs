// DataFusion engine connection
//
// Implements the engine seam on a DataFusion SessionContext. Async engine
// calls are driven to completion on the connection's own runtime, so these
// types must not be used from inside another tokio runtime's worker; use
// `spawn_blocking` there.

use anyhow::{Context, Result};
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::logical_expr::LogicalPlan;
use datafusion::physical_plan::{RecordBatchStream, SendableRecordBatchStream};
use datafusion::prelude::SessionContext;
use datafusion::scalar::ScalarValue;
use futures::StreamExt;
use std::sync::{Arc, RwLock};
use tokio::runtime::Runtime;

use super::types::logical_type_of;
use crate::models::{ColumnDescriptor, LogicalType};
use crate::services::engine::{DataChunk, EngineConnection, PreparedHandle, ResultCursor};

type SharedTimezone = Arc<RwLock<Option<String>>>;

fn read_timezone(timezone: &SharedTimezone) -> Option<String> {
    timezone
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

fn describe(schema: &SchemaRef) -> Vec<ColumnDescriptor> {
    schema
        .fields()
        .iter()
        .map(|field| ColumnDescriptor::new(field.name(), logical_type_of(field.data_type())))
        .collect()
}

/// A live DataFusion session
pub struct DataFusionConnection {
    ctx: SessionContext,
    runtime: Arc<Runtime>,
    timezone: SharedTimezone,
}

impl DataFusionConnection {
    pub fn new(ctx: SessionContext, runtime: Arc<Runtime>) -> Self {
        Self {
            ctx,
            runtime,
            timezone: Arc::new(RwLock::new(None)),
        }
    }

    /// Change the session timezone
    ///
    /// Statements prepared earlier see the new value on their next schema
    /// derivation.
    pub fn set_timezone(&self, timezone: Option<&str>) {
        let mut current = self
            .timezone
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = timezone.map(str::to_string);
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }
}

impl EngineConnection for DataFusionConnection {
    type Prepared = DataFusionPrepared;

    fn prepare(&self, sql: &str) -> Result<DataFusionPrepared> {
        let state = self.ctx.state();
        let plan = self
            .runtime
            .block_on(state.create_logical_plan(sql))
            .context("Failed to plan SQL")?;

        let parameter_types = placeholder_types(&plan)?;

        Ok(DataFusionPrepared {
            ctx: self.ctx.clone(),
            runtime: Arc::clone(&self.runtime),
            timezone: Arc::clone(&self.timezone),
            plan,
            parameter_types,
        })
    }

    fn timezone(&self) -> Option<String> {
        read_timezone(&self.timezone)
    }
}

/// Placeholder types ordered `$1`, `$2`, ...; untyped placeholders are Unknown
fn placeholder_types(plan: &LogicalPlan) -> Result<Vec<LogicalType>> {
    let mut placeholders: Vec<(usize, LogicalType)> = plan
        .get_parameter_types()
        .context("Failed to infer parameter types")?
        .into_iter()
        .map(|(id, data_type)| {
            let position = id.trim_start_matches('$').parse::<usize>().unwrap_or(usize::MAX);
            let logical = data_type
                .as_ref()
                .map(logical_type_of)
                .unwrap_or(LogicalType::Unknown);
            (position, logical)
        })
        .collect();

    placeholders.sort_by_key(|(position, _)| *position);
    Ok(placeholders.into_iter().map(|(_, logical)| logical).collect())
}

/// A planned DataFusion statement
pub struct DataFusionPrepared {
    ctx: SessionContext,
    runtime: Arc<Runtime>,
    timezone: SharedTimezone,
    plan: LogicalPlan,
    parameter_types: Vec<LogicalType>,
}

impl DataFusionPrepared {
    pub fn logical_plan(&self) -> &LogicalPlan {
        &self.plan
    }
}

impl PreparedHandle for DataFusionPrepared {
    type Cursor = DataFusionCursor;

    fn columns(&self) -> Vec<ColumnDescriptor> {
        describe(self.plan.schema().inner())
    }

    fn parameter_types(&self) -> Vec<LogicalType> {
        self.parameter_types.clone()
    }

    fn timezone(&self) -> Option<String> {
        read_timezone(&self.timezone)
    }

    fn execute(&self, parameters: &[ScalarValue]) -> Result<DataFusionCursor> {
        let plan = if parameters.is_empty() {
            self.plan.clone()
        } else {
            self.plan
                .clone()
                .with_param_values(parameters.to_vec())
                .context("Failed to bind parameters")?
        };

        let ctx = self.ctx.clone();
        let stream = self.runtime.block_on(async move {
            let df = ctx.execute_logical_plan(plan).await?;
            df.execute_stream().await
        })?;

        Ok(DataFusionCursor {
            columns: describe(&stream.schema()),
            timezone: self.timezone(),
            runtime: Arc::clone(&self.runtime),
            stream,
        })
    }
}

/// Pulls record batches off a DataFusion stream one fetch at a time
pub struct DataFusionCursor {
    columns: Vec<ColumnDescriptor>,
    timezone: Option<String>,
    runtime: Arc<Runtime>,
    stream: SendableRecordBatchStream,
}

impl ResultCursor for DataFusionCursor {
    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.columns.clone()
    }

    fn timezone(&self) -> Option<String> {
        self.timezone.clone()
    }

    fn fetch_chunk(&mut self) -> Result<Option<DataChunk>> {
        match self.runtime.block_on(self.stream.next()) {
            Some(batch) => {
                let batch = batch?;
                Ok(Some(DataChunk::from_record_batch(&batch)))
            }
            None => Ok(None),
        }
    }
}
