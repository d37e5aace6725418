//! Intercepted operation descriptors.
//!
//! A descriptor is built by the dispatcher from the intercepted call and is
//! never persisted. Operation names are the method names the application
//! exposes; the [`names`] module lists the guarded ones.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Guarded operation names per controller.
pub mod names {
    /// Operations of the grade controller.
    pub mod grades {
        /// List a student's grades.
        pub const LIST: &str = "listar";
        /// Show the average form for a student.
        pub const SHOW_AVERAGE_FORM: &str = "mostrarFormularioPromedio";
        /// Compute a student's average for a subject.
        pub const COMPUTE_AVERAGE: &str = "calcularPromedio";
        /// Open a new grade for a student.
        pub const CREATE: &str = "nueva";
        /// Persist a grade.
        pub const SAVE: &str = "guardar";
        /// Open an existing grade by id.
        pub const EDIT: &str = "editar";
        /// Delete a grade by id.
        pub const DELETE: &str = "eliminar";
    }

    /// Operations of the student controller.
    pub mod students {
        /// List the roster.
        pub const LIST: &str = "listar";
        /// Open a new student record.
        pub const CREATE: &str = "nuevo";
        /// Persist a student record.
        pub const SAVE: &str = "guardar";
        /// Open an existing student record by id.
        pub const EDIT: &str = "editar";
        /// Delete a student record by id.
        pub const DELETE: &str = "eliminar";
    }

    /// Operations of the grade service.
    pub mod grade_service {
        /// Average of a student's grades in one subject.
        pub const AVERAGE_BY_SUBJECT: &str = "calcularPromedioPorMateria";
    }
}

/// Target of an intercepted call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// `NotaController`
    Grades,
    /// `EstudianteController`
    Students,
    /// `ServicioNota`
    GradeService,
    /// Anything the policy table does not know.
    Other(String),
}

impl Controller {
    /// Name as exposed by the application.
    pub fn as_str(&self) -> &str {
        match self {
            Controller::Grades => "NotaController",
            Controller::Students => "EstudianteController",
            Controller::GradeService => "ServicioNota",
            Controller::Other(name) => name,
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Controller {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NotaController" | "notas" | "grades" => Controller::Grades,
            "EstudianteController" | "estudiantes" | "students" => Controller::Students,
            "ServicioNota" | "grade-service" => Controller::GradeService,
            other => Controller::Other(other.to_string()),
        })
    }
}

/// One positional argument of an intercepted call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// Integer-typed argument (ids)
    Integer(i64),
    /// Floating point argument
    Decimal(f64),
    /// Free text argument
    Text(String),
    /// Structured form payload
    Record(serde_json::Value),
}

impl Argument {
    /// Best-effort typing of a raw textual argument.
    pub fn parse(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return Argument::Integer(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Argument::Decimal(value);
        }
        if raw.trim_start().starts_with('{') {
            if let Ok(value) = serde_json::from_str(raw) {
                return Argument::Record(value);
            }
        }
        Argument::Text(raw.to_string())
    }

    /// The integer value, when integer-typed.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Argument::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The text value, when text-typed.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Integer(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<serde_json::Value> for Argument {
    fn from(value: serde_json::Value) -> Self {
        Argument::Record(value)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Integer(value) => write!(f, "{value}"),
            Argument::Decimal(value) => write!(f, "{value}"),
            Argument::Text(value) => f.write_str(value),
            Argument::Record(value) => write!(f, "{value}"),
        }
    }
}

/// An intercepted call: target, operation name, ordered arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Target controller
    pub controller: Controller,
    /// Operation (method) name
    pub operation: String,
    /// Positional arguments in call order
    pub arguments: Vec<Argument>,
}

impl OperationDescriptor {
    /// Describe a call with no arguments yet.
    pub fn new(controller: Controller, operation: impl Into<String>) -> Self {
        Self {
            controller,
            operation: operation.into(),
            arguments: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn with_argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Replace the argument list.
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// First integer-typed argument, wherever it sits in the list.
    pub fn first_integer(&self) -> Option<i64> {
        self.arguments.iter().find_map(Argument::as_integer)
    }

    /// First text argument.
    pub fn first_text(&self) -> Option<&str> {
        self.arguments.iter().find_map(Argument::as_text)
    }

    /// First structured payload argument.
    pub fn first_record(&self) -> Option<&serde_json::Value> {
        self.arguments.iter().find_map(|arg| match arg {
            Argument::Record(value) => Some(value),
            _ => None,
        })
    }

    /// `Controller.operation`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.controller, self.operation)
    }

    /// Action label written to the audit trail and the violation signal.
    ///
    /// Grade controller actions use the bare operation name; every other
    /// controller is qualified.
    pub fn attempted_action(&self) -> String {
        match self.controller {
            Controller::Grades => self.operation.clone(),
            _ => self.qualified_name(),
        }
    }

    /// Argument list rendered as `[a, b, c]`.
    pub fn arguments_display(&self) -> String {
        let rendered: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
        format!("[{}]", rendered.join(", "))
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.qualified_name(), self.arguments_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_integer_skips_non_integer_arguments() {
        let descriptor = OperationDescriptor::new(Controller::Grades, names::grades::COMPUTE_AVERAGE)
            .with_argument("Matemáticas")
            .with_argument(7);
        assert_eq!(descriptor.first_integer(), Some(7));
        assert_eq!(descriptor.arguments_display(), "[Matemáticas, 7]");
    }

    #[test]
    fn attempted_action_is_qualified_outside_the_grade_controller() {
        let grades = OperationDescriptor::new(Controller::Grades, names::grades::EDIT);
        assert_eq!(grades.attempted_action(), "editar");

        let students = OperationDescriptor::new(Controller::Students, names::students::DELETE);
        assert_eq!(students.attempted_action(), "EstudianteController.eliminar");
    }

    #[test]
    fn raw_arguments_are_typed() {
        assert_eq!(Argument::parse("42"), Argument::Integer(42));
        assert_eq!(Argument::parse("4.5"), Argument::Decimal(4.5));
        assert_eq!(Argument::parse("Historia"), Argument::Text("Historia".into()));
        assert!(matches!(
            Argument::parse(r#"{"materia":"Historia"}"#),
            Argument::Record(_)
        ));
    }

    #[test]
    fn controllers_parse_from_aliases() {
        assert_eq!("notas".parse::<Controller>(), Ok(Controller::Grades));
        assert_eq!(
            "EstudianteController".parse::<Controller>(),
            Ok(Controller::Students)
        );
        assert_eq!(
            "LoginController".parse::<Controller>(),
            Ok(Controller::Other("LoginController".into()))
        );
    }
}
