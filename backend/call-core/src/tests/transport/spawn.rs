// Unit tests for backend command construction

use crate::config::BackendConfig;
use crate::error::spawn::SpawnError;
use crate::transport::BackendCommand;
use crate::transport::spawn::build_spawn_command;

use tempfile::TempDir;

#[test]
fn given_backend_config_when_converted_then_command_matches() {
    let config = BackendConfig {
        program: "python".to_string(),
        args: vec!["python/softphone.py".to_string()],
        working_dir: Some("/srv/softphone".to_string()),
    };

    let command = BackendCommand::from(&config);

    assert_eq!(command.program, "python");
    assert_eq!(command.args, vec!["python/softphone.py"]);
    assert_eq!(
        command.working_dir.as_deref(),
        Some(std::path::Path::new("/srv/softphone"))
    );
    assert_eq!(command.display(), "python python/softphone.py");
}

/// **VALUE**: Verifies that unusable commands are rejected before spawning.
///
/// **BUG THIS CATCHES**: Would catch a blank program reaching the OS, which reports a
/// confusing permission or not-found error instead of a configuration problem.
#[test]
fn given_blank_program_or_missing_dir_when_validated_then_validation_error() {
    // GIVEN
    let blank = BackendCommand::new("  ");
    let missing_dir = BackendCommand::new("sh").with_working_dir("/definitely/not/here");

    // WHEN / THEN
    assert!(matches!(blank.validate(), Err(SpawnError::Validation { .. })));
    assert!(matches!(
        missing_dir.validate(),
        Err(SpawnError::Validation { .. })
    ));
}

#[test]
fn given_existing_dir_when_validated_then_ok() {
    let dir = TempDir::new().expect("temp dir");

    let command = BackendCommand::new("sh").with_working_dir(dir.path());

    assert!(command.validate().is_ok());
}

#[test]
fn given_command_when_built_then_program_and_args_applied() {
    let command = BackendCommand::new("python").with_args(["-u", "softphone.py"]);

    let built = build_spawn_command(&command);
    let std_command = built.as_std();

    assert_eq!(std_command.get_program(), "python");
    let args: Vec<_> = std_command.get_args().collect();
    assert_eq!(args, vec!["-u", "softphone.py"]);
}
