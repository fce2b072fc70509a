//! Test doubles shared by the module tests.

use parking_lot::Mutex;

use super::assisted::{AssistedRequest, AssistedService, RequestKind, ServiceError};
use super::features::FEATURE_COUNT;
use super::model::{InferenceError, RegressionModel};

/// Answers each request kind with a scripted reply and records the calls
pub struct ScriptedService {
    route: Result<String, ServiceError>,
    reduction: Result<String, ServiceError>,
    calls: Mutex<Vec<RequestKind>>,
}

impl ScriptedService {
    pub fn new(
        route: Result<String, ServiceError>,
        reduction: Result<String, ServiceError>,
    ) -> Self {
        Self { route, reduction, calls: Mutex::new(Vec::new()) }
    }

    /// Every call fails with `error`
    pub fn failing(error: ServiceError) -> Self {
        Self::new(Err(error.clone()), Err(error))
    }

    pub fn calls(&self) -> Vec<RequestKind> {
        self.calls.lock().clone()
    }
}

impl AssistedService for ScriptedService {
    fn complete(&self, request: &AssistedRequest) -> Result<String, ServiceError> {
        self.calls.lock().push(request.kind);
        match request.kind {
            RequestKind::Route => self.route.clone(),
            RequestKind::Reduction => self.reduction.clone(),
        }
    }
}

/// Returns a fixed value and remembers the last input row
pub struct StubModel {
    pub output: Result<f64, InferenceError>,
    pub last_input: Mutex<Option<[f32; FEATURE_COUNT]>>,
}

impl StubModel {
    pub fn returning(output: Result<f64, InferenceError>) -> Self {
        Self { output, last_input: Mutex::new(None) }
    }

    pub fn was_called(&self) -> bool {
        self.last_input.lock().is_some()
    }
}

impl RegressionModel for StubModel {
    fn predict(&self, scaled: &[f32; FEATURE_COUNT]) -> Result<f64, InferenceError> {
        *self.last_input.lock() = Some(*scaled);
        self.output.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}
