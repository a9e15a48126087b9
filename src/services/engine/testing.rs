// Scripted engine for tests
//
// Each execute call replays the next scripted run: a sequence of chunks and
// failures handed out one fetch at a time.

use anyhow::{anyhow, Result};
use datafusion::arrow::array::{ArrayRef, Int32Array};
use datafusion::scalar::ScalarValue;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use super::{DataChunk, EngineConnection, PreparedHandle, ResultCursor};
use crate::models::{ColumnDescriptor, LogicalType};

pub(crate) enum Step {
    Chunk(Vec<ArrayRef>, usize),
    Fail(String),
}

/// One chunk holding a single INTEGER column
pub(crate) fn int_chunk(values: Vec<i32>) -> Step {
    let len = values.len();
    Step::Chunk(vec![Arc::new(Int32Array::from(values))], len)
}

struct Shared {
    columns: Vec<ColumnDescriptor>,
    parameter_types: Vec<LogicalType>,
    timezone: RefCell<Option<String>>,
    result_timezone: RefCell<Option<String>>,
    execute_error: Option<String>,
    runs: RefCell<VecDeque<Vec<Step>>>,
    executions: Cell<usize>,
    last_parameters: RefCell<Vec<ScalarValue>>,
}

pub(crate) struct ScriptedConnection {
    shared: Rc<Shared>,
    prepare_error: Option<String>,
}

impl ScriptedConnection {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            shared: Rc::new(Shared {
                columns,
                parameter_types: Vec::new(),
                timezone: RefCell::new(None),
                result_timezone: RefCell::new(None),
                execute_error: None,
                runs: RefCell::new(VecDeque::new()),
                executions: Cell::new(0),
                last_parameters: RefCell::new(Vec::new()),
            }),
            prepare_error: None,
        }
    }

    fn shared_mut(&mut self) -> &mut Shared {
        Rc::get_mut(&mut self.shared).expect("configure before preparing")
    }

    pub fn with_run(self, steps: Vec<Step>) -> Self {
        self.shared.runs.borrow_mut().push_back(steps);
        self
    }

    pub fn with_parameters(mut self, parameter_types: Vec<LogicalType>) -> Self {
        self.shared_mut().parameter_types = parameter_types;
        self
    }

    pub fn with_timezone(self, timezone: &str) -> Self {
        self.set_timezone(Some(timezone));
        self
    }

    /// Timezone reported by cursors, when it should differ from the session
    pub fn with_result_timezone(self, timezone: &str) -> Self {
        *self.shared.result_timezone.borrow_mut() = Some(timezone.to_string());
        self
    }

    pub fn failing_prepare(mut self, message: &str) -> Self {
        self.prepare_error = Some(message.to_string());
        self
    }

    pub fn failing_execute(mut self, message: &str) -> Self {
        self.shared_mut().execute_error = Some(message.to_string());
        self
    }

    pub fn set_timezone(&self, timezone: Option<&str>) {
        *self.shared.timezone.borrow_mut() = timezone.map(str::to_string);
    }

    pub fn executions(&self) -> usize {
        self.shared.executions.get()
    }

    pub fn last_parameters(&self) -> Vec<ScalarValue> {
        self.shared.last_parameters.borrow().clone()
    }
}

impl EngineConnection for ScriptedConnection {
    type Prepared = ScriptedPrepared;

    fn prepare(&self, _sql: &str) -> Result<ScriptedPrepared> {
        if let Some(message) = &self.prepare_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(ScriptedPrepared {
            shared: Rc::clone(&self.shared),
        })
    }

    fn timezone(&self) -> Option<String> {
        self.shared.timezone.borrow().clone()
    }
}

pub(crate) struct ScriptedPrepared {
    shared: Rc<Shared>,
}

impl PreparedHandle for ScriptedPrepared {
    type Cursor = ScriptedCursor;

    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.shared.columns.clone()
    }

    fn parameter_types(&self) -> Vec<LogicalType> {
        self.shared.parameter_types.clone()
    }

    fn timezone(&self) -> Option<String> {
        self.shared.timezone.borrow().clone()
    }

    fn execute(&self, parameters: &[ScalarValue]) -> Result<ScriptedCursor> {
        self.shared.executions.set(self.shared.executions.get() + 1);
        *self.shared.last_parameters.borrow_mut() = parameters.to_vec();

        if let Some(message) = &self.shared.execute_error {
            return Err(anyhow!(message.clone()));
        }

        let steps = self.shared.runs.borrow_mut().pop_front().unwrap_or_default();
        let timezone = self
            .shared
            .result_timezone
            .borrow()
            .clone()
            .or_else(|| self.timezone());

        Ok(ScriptedCursor {
            columns: self.shared.columns.clone(),
            timezone,
            steps: steps.into(),
        })
    }
}

pub(crate) struct ScriptedCursor {
    columns: Vec<ColumnDescriptor>,
    timezone: Option<String>,
    steps: VecDeque<Step>,
}

impl ResultCursor for ScriptedCursor {
    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.columns.clone()
    }

    fn timezone(&self) -> Option<String> {
        self.timezone.clone()
    }

    fn fetch_chunk(&mut self) -> Result<Option<DataChunk>> {
        match self.steps.pop_front() {
            Some(Step::Chunk(columns, cardinality)) => Ok(Some(DataChunk::new(columns, cardinality))),
            Some(Step::Fail(message)) => Err(anyhow!(message)),
            None => Ok(None),
        }
    }
}
