use crate::backend::SchemaBackend;
use crate::migration::error::ExecutionError;
use crate::migration::operation::SchemaOperation;
use std::cell::RefCell;

/// Backend that records operations instead of running them
///
/// Failures can be injected by position (`fail_at`) or by operation kind
/// (`fail_on`). A failed operation is not recorded.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    prefix: String,
    operations: RefCell<Vec<SchemaOperation>>,
    fail_at: Option<usize>,
    fail_on: Option<&'static str>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Fail the operation at zero-based position `position`
    pub fn fail_at(mut self, position: usize) -> Self {
        self.fail_at = Some(position);
        self
    }

    /// Fail the first operation whose [`kind`](SchemaOperation::kind) is `kind`
    pub fn fail_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Operations executed so far, in order
    pub fn operations(&self) -> Vec<SchemaOperation> {
        self.operations.borrow().clone()
    }

    pub fn take_operations(&self) -> Vec<SchemaOperation> {
        self.operations.borrow_mut().drain(..).collect()
    }

    /// Kinds of the operations executed so far
    pub fn kinds(&self) -> Vec<&'static str> {
        self.operations.borrow().iter().map(SchemaOperation::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.borrow().is_empty()
    }
}

impl SchemaBackend for RecordingBackend {
    fn execute(&self, operation: &SchemaOperation) -> Result<(), ExecutionError> {
        let position = self.len();
        if self.fail_at == Some(position) || self.fail_on == Some(operation.kind()) {
            return Err(ExecutionError::Query(format!("injected failure: {operation}")));
        }
        self.operations.borrow_mut().push(operation.clone());
        Ok(())
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }
}
