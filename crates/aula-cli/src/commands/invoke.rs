//! `aula invoke`: run one guarded operation as an actor.

use crate::app::{App, Outcome};
use anyhow::{anyhow, Context, Result};
use aula_core::{Actor, Argument, Controller, OperationDescriptor};
use clap::Args;

/// Invoke a guarded operation
#[derive(Debug, Clone, Args)]
pub struct InvokeCommand {
    /// Actor name
    #[arg(long, required_unless_present = "anonymous")]
    pub name: Option<String>,

    /// Actor role (ALUMNO or PROFESOR)
    #[arg(long, default_value = "ALUMNO")]
    pub role: String,

    /// Student record owned by the actor (students only)
    #[arg(long)]
    pub student_id: Option<i64>,

    /// Call without a session
    #[arg(long, conflicts_with_all = ["name", "student_id"])]
    pub anonymous: bool,

    /// Target controller (NotaController, EstudianteController, ServicioNota, ...)
    pub controller: String,

    /// Operation name (listar, editar, calcularPromedio, ...)
    pub operation: String,

    /// Positional arguments; integers, decimals, JSON objects, or text
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl InvokeCommand {
    /// The intercepted call this command describes.
    pub fn descriptor(&self) -> OperationDescriptor {
        let controller: Controller = match self.controller.parse() {
            Ok(controller) => controller,
            Err(never) => match never {},
        };
        OperationDescriptor::new(controller, self.operation.clone())
            .with_arguments(self.args.iter().map(|raw| Argument::parse(raw)).collect())
    }

    /// The acting principal, validated like the identification form.
    pub fn actor(&self) -> Result<Option<Actor>> {
        if self.anonymous {
            return Ok(None);
        }
        let name = self.name.as_deref().unwrap_or_default();
        let actor = Actor::identify(name, &self.role, self.student_id)
            .map_err(|e| anyhow!("{} ({})", e, e.code()))
            .context("Invalid identification")?;
        Ok(Some(actor))
    }
}

/// Log in (unless anonymous), dispatch, log out.
pub async fn handle_invoke_command(app: &App, command: &InvokeCommand) -> Result<Outcome> {
    let descriptor = command.descriptor();
    let session = match command.actor()? {
        Some(actor) => Some(app.login(actor).await),
        None => None,
    };

    let outcome = app.invoke(session.as_ref(), descriptor).await;
    if let Some(session) = &session {
        app.logout(session).await?;
    }
    Ok(outcome?)
}
