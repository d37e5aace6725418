//! Violation-to-Response Translator
//!
//! Pure mapping from failures at the boundary to user-facing redirects.
//! Violations carry `tipoViolacion`, `usuario`, `operacion`, `detalles`,
//! and `codigoError`; not-found failures carry `mensaje` and `codigo`.

use crate::dispatcher::DispatchError;
use aula_core::violation::FORBIDDEN_CODE;
use aula_core::{AulaError, RedirectConfig, ViolationSignal};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Violation type reported for permission failures raised below the guard.
pub const ACCESS_DENIED: &str = "ACCESO_DENEGADO";

/// Default status code of a not-found redirect.
pub const NOT_FOUND_CODE: &str = "404";

const GENERIC_USER: &str = "Usuario";
const RESTRICTED_OPERATION: &str = "Operación restringida";
const DEFAULT_DENIAL_DETAILS: &str = "Acceso denegado";

/// Redirect target with ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Display surface path
    pub path: String,
    /// Query parameters in render order
    pub params: Vec<(String, String)>,
}

impl Redirect {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            params: Vec::new(),
        }
    }

    fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    /// Value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `path?a=..&b=..`, form-urlencoded.
    pub fn to_url(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{query}", self.path)
    }
}

/// Maps boundary failures to redirects.
#[derive(Debug, Clone, Default)]
pub struct ResponseTranslator {
    redirects: RedirectConfig,
}

impl ResponseTranslator {
    /// Translator rendering to the configured paths.
    pub fn new(redirects: RedirectConfig) -> Self {
        Self { redirects }
    }

    /// A violation raised by the dispatcher.
    pub fn translate(&self, signal: &ViolationSignal) -> Redirect {
        Redirect::new(&self.redirects.violation_path)
            .with("tipoViolacion", signal.kind.code())
            .with("usuario", signal.actor_name.as_str())
            .with("operacion", signal.operation.as_str())
            .with("detalles", signal.details.as_str())
            .with("codigoError", signal.error_code.as_str())
    }

    /// A generic permission failure from a lower layer, in the same shape.
    pub fn translate_permission_failure(&self, message: Option<&str>) -> Redirect {
        let details = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_DENIAL_DETAILS);
        Redirect::new(&self.redirects.violation_path)
            .with("tipoViolacion", ACCESS_DENIED)
            .with("usuario", GENERIC_USER)
            .with("operacion", RESTRICTED_OPERATION)
            .with("detalles", details)
            .with("codigoError", FORBIDDEN_CODE)
    }

    /// A missing resource.
    pub fn translate_not_found(&self, message: &str, code: Option<&str>) -> Redirect {
        Redirect::new(&self.redirects.not_found_path)
            .with("mensaje", message)
            .with("codigo", code.unwrap_or(NOT_FOUND_CODE))
    }

    /// Any dispatch failure that has a redirect. Other operation failures
    /// are left to the caller.
    pub fn translate_dispatch_error(&self, error: &DispatchError) -> Option<Redirect> {
        match error {
            DispatchError::Violation(signal) => Some(self.translate(signal)),
            DispatchError::Operation(AulaError::PermissionDenied { message }) => {
                Some(self.translate_permission_failure(Some(message)))
            }
            DispatchError::Operation(AulaError::NotFound { message }) => {
                Some(self.translate_not_found(message, None))
            }
            DispatchError::Operation(_) => None,
        }
    }
}
