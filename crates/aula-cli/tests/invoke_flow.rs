//! The `aula` command handlers against a seeded application.

use assert_matches::assert_matches;
use aula_cli::app::Outcome;
use aula_cli::commands::{handle_audit_command, handle_invoke_command, AuditCommand, InvokeCommand};
use aula_cli::App;
use aula_core::{AuditBackend, AulaConfig};

const CONFIG: &str = r#"
[audit]
backend = "memory"

[diagnostics]
timing = false

[[seed.students]]
id = 7
first_name = "Luis"
last_name = "Pérez"

[[seed.students]]
id = 9
first_name = "Marta"
last_name = "Gómez"

[[seed.grades]]
id = 15
student_id = 9
subject = "Historia"
value = 3.8
percentage = 30.0
"#;

async fn app() -> App {
    let config = AulaConfig::from_toml_str(CONFIG).unwrap();
    assert_eq!(config.audit.backend, AuditBackend::Memory);
    App::from_config(&config).await.unwrap()
}

fn invoke(name: Option<&str>, role: &str, student: Option<i64>, call: &[&str]) -> InvokeCommand {
    InvokeCommand {
        name: name.map(str::to_string),
        role: role.to_string(),
        student_id: student,
        anonymous: name.is_none(),
        controller: call[0].to_string(),
        operation: call[1].to_string(),
        args: call[2..].iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn student_edit_of_foreign_grade_redirects_and_is_audited() {
    let app = app().await;
    let command = invoke(Some("Luis"), "ALUMNO", Some(7), &["notas", "editar", "15"]);

    let outcome = handle_invoke_command(&app, &command).await.unwrap();
    let redirect = assert_matches!(outcome, Outcome::Redirected(redirect) => redirect);
    assert_eq!(redirect.param("tipoViolacion"), Some("RECURSO_NO_PERMITIDO"));
    assert_eq!(redirect.param("operacion"), Some("editar"));

    let trail = handle_audit_command(&app, &AuditCommand { count: false })
        .await
        .unwrap();
    assert!(trail.contains("User: Luis"));
    assert!(trail.contains("Action: editar"));
    assert_eq!(
        handle_audit_command(&app, &AuditCommand { count: true })
            .await
            .unwrap(),
        "1"
    );
}

#[tokio::test]
async fn teacher_reads_any_student() {
    let app = app().await;
    let command = invoke(Some("Ana"), "PROFESOR", None, &["NotaController", "listar", "9"]);
    let outcome = handle_invoke_command(&app, &command).await.unwrap();
    let value = assert_matches!(outcome, Outcome::Completed(value) => value);
    assert_eq!(value["estudiante"]["first_name"], "Marta");
}

#[tokio::test]
async fn anonymous_roster_view_is_denied() {
    let app = app().await;
    let command = invoke(None, "ALUMNO", None, &["estudiantes", "listar"]);
    let outcome = handle_invoke_command(&app, &command).await.unwrap();
    let redirect = assert_matches!(outcome, Outcome::Redirected(redirect) => redirect);
    assert_eq!(redirect.param("tipoViolacion"), Some("USUARIO_NO_AUTENTICADO"));
    assert_eq!(redirect.param("usuario"), Some("ANONIMO"));
}

#[tokio::test]
async fn missing_student_translates_to_not_found() {
    let app = app().await;
    let command = invoke(Some("Ana"), "PROFESOR", None, &["estudiantes", "editar", "42"]);
    let outcome = handle_invoke_command(&app, &command).await.unwrap();
    let redirect = assert_matches!(outcome, Outcome::Redirected(redirect) => redirect);
    assert_eq!(redirect.path, "/error/estudiante-no-encontrado");
    assert_eq!(redirect.param("codigo"), Some("404"));
}

#[tokio::test]
async fn student_without_id_fails_identification() {
    let app = app().await;
    let command = invoke(Some("Luis"), "ALUMNO", None, &["notas", "listar", "7"]);
    let error = handle_invoke_command(&app, &command).await.unwrap_err();
    assert!(format!("{error:#}").contains("estudiante_id_requerido"));
}

#[tokio::test]
async fn file_backend_keeps_denials_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AulaConfig::from_toml_str(CONFIG).unwrap();
    config.audit.backend = AuditBackend::File;
    config.audit.path = dir.path().join("audit").join("violations.jsonl");

    let app = App::from_config(&config).await.unwrap();
    let command = invoke(Some("Luis"), "ALUMNO", Some(7), &["notas", "eliminar", "15"]);
    let outcome = handle_invoke_command(&app, &command).await.unwrap();
    assert_matches!(outcome, Outcome::Redirected(_));
    drop(app);

    let on_disk = std::fs::read_to_string(&config.audit.path).unwrap();
    assert!(on_disk.contains("\"attempted_action\":\"eliminar\""));

    let restarted = App::from_config(&config).await.unwrap();
    assert_eq!(
        handle_audit_command(&restarted, &AuditCommand { count: true })
            .await
            .unwrap(),
        "1"
    );
}
