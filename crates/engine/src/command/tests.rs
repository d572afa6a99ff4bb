use std::path::PathBuf;
use std::time::Duration;

use super::*;

fn alice() -> TargetUser {
	TargetUser::new("alice", 501, PathBuf::from("/Users/alice"))
}

#[test]
fn wrap_for_user_prefixes_launchctl_and_sudo() {
	let command = CommandLine::new("defaults").arg("write").arg("com.apple.dock").wrap_for_user(&alice());

	assert_eq!(command.program(), "launchctl");
	assert_eq!(
		command.to_string(),
		"launchctl asuser 501 sudo -u alice defaults write com.apple.dock"
	);
}

#[test]
fn display_joins_arguments() {
	let command = CommandLine::new("mdfind").arg("kMDItemCFBundleIdentifier == 'com.apple.Safari'");
	assert_eq!(command.to_string(), "mdfind kMDItemCFBundleIdentifier == 'com.apple.Safari'");
	assert_eq!(command.args().len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn run_returns_stdout() {
	let runner = CommandRunner::new(Duration::from_secs(5));
	let out = runner
		.run(&CommandLine::new("sh").arg("-c").arg("printf 'one\\ntwo\\n'"))
		.await
		.expect("command succeeds");
	assert_eq!(out, "one\ntwo\n");
}

#[cfg(unix)]
#[tokio::test]
async fn run_reports_non_zero_exit_with_stderr() {
	let runner = CommandRunner::new(Duration::from_secs(5));
	let err = runner
		.run(&CommandLine::new("sh").arg("-c").arg("echo nope >&2; exit 3"))
		.await
		.expect_err("command fails");

	match err {
		CommandError::Failed { program, status, stderr } => {
			assert_eq!(program, "sh");
			assert_eq!(status.code(), Some(3));
			assert_eq!(stderr, "nope");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[cfg(unix)]
#[tokio::test]
async fn run_times_out_slow_children() {
	let runner = CommandRunner::new(Duration::from_millis(100));
	let err = runner
		.run(&CommandLine::new("sleep").arg("5"))
		.await
		.expect_err("command times out");
	assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn run_reports_missing_program() {
	let runner = CommandRunner::default();
	let err = runner
		.run(&CommandLine::new("dockhand-test-no-such-program"))
		.await
		.expect_err("spawn fails");
	assert!(matches!(err, CommandError::Spawn { .. }), "{err}");
}
