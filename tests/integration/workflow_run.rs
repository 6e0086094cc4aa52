use xcode_runner::{
    config::{DeployFailurePolicy, RunnerConfig, SchemeSelection},
    lib::{
        errors::RunnerError,
        process::{CommandOutput, ScriptedCommandRunner},
    },
    runner::{ScriptedChooser, StepStatus, TargetKind, Workflow, WorkflowOptions, WorkflowStage},
};

use crate::common::{
    build_prefix, fixture, project_dir, settings_prefix, simctl_config, with_simulator_defaults,
    DEVICE_UDID, SIMULATOR_APP, SIMULATOR_UDID,
};

#[tokio::test]
async fn simulator_run_issues_commands_in_order() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new());
    let chooser = ScriptedChooser::new().answer("App").answer("iPhone 15");
    let config = simctl_config();

    let summary = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect("workflow should succeed");

    assert_eq!(summary.scheme, "App");
    assert_eq!(summary.device_name, "iPhone 15");
    assert_eq!(summary.device_id, SIMULATOR_UDID);
    assert_eq!(summary.target, TargetKind::Simulator);
    assert_eq!(summary.app_path, SIMULATOR_APP);
    assert_eq!(summary.bundle_identifier, "com.example.App");
    assert!(summary.deploy.succeeded());
    assert_eq!(
        chooser.prompts(),
        vec!["Select a Scheme".to_string(), "Select a Device".to_string()]
    );

    let expected = vec![
        "xcodebuild -project App.xcodeproj -list".to_string(),
        "xcrun simctl list devices --json".to_string(),
        format!(
            "xcodebuild -project App.xcodeproj -scheme App -destination id={SIMULATOR_UDID} -showBuildSettings -json"
        ),
        format!(
            "xcodebuild -project App.xcodeproj -scheme App -destination id={SIMULATOR_UDID} -configuration Debug build"
        ),
        format!("xcrun simctl bootstatus {SIMULATOR_UDID} -b"),
        format!("xcrun simctl install {SIMULATOR_UDID} {SIMULATOR_APP}"),
        format!("xcrun simctl launch {SIMULATOR_UDID} com.example.App"),
    ];
    assert_eq!(runner.command_lines(), expected);

    let invocations = runner.invocations();
    assert_eq!(invocations[0].current_dir.as_deref(), Some(dir.path()));
}

#[tokio::test]
async fn device_run_installs_with_devicectl() {
    let dir = project_dir();
    let runner = ScriptedCommandRunner::new()
        .respond(
            "xcodebuild -project App.xcodeproj -list",
            CommandOutput::success(fixture("xcodebuild_list_project.txt")),
        )
        .respond(
            "xcrun xctrace list devices",
            CommandOutput::success(fixture("xctrace_devices.txt")),
        )
        .respond(
            settings_prefix(DEVICE_UDID),
            CommandOutput::success(fixture("build_settings_device.json")),
        )
        .respond(build_prefix(DEVICE_UDID), CommandOutput::success(""))
        .respond("xcrun devicectl", CommandOutput::success(""));
    let chooser = ScriptedChooser::new();
    let config = RunnerConfig::default();

    let summary = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions {
            scheme: Some("App".into()),
            device: Some("Dev iPhone".into()),
        },
    )
    .run()
    .await
    .expect("workflow should succeed");

    assert_eq!(summary.target, TargetKind::Device);
    assert!(chooser.prompts().is_empty());

    let lines = runner.command_lines();
    assert_eq!(lines.len(), 6);
    assert!(lines[4].starts_with(&format!(
        "xcrun devicectl device install app --device {DEVICE_UDID} --bundle "
    )));
    assert_eq!(
        lines[5],
        format!(
            "xcrun devicectl device process launch --device {DEVICE_UDID} --start-stopped com.example.App"
        )
    );
}

#[tokio::test]
async fn first_scheme_policy_skips_the_scheme_prompt() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new());
    let chooser = ScriptedChooser::new().answer("iPhone 15");
    let mut config = simctl_config();
    config.workflow.scheme_selection = SchemeSelection::First;

    let summary = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect("workflow should succeed");

    assert_eq!(summary.scheme, "App");
    assert_eq!(chooser.prompts(), vec!["Select a Device".to_string()]);
}

#[tokio::test]
async fn failing_install_aborts_before_launch() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new().respond(
        "xcrun simctl install",
        CommandOutput::failure(22, "An application bundle was not found"),
    ));
    let chooser = ScriptedChooser::new().answer("App").answer("iPhone 15");
    let config = simctl_config();

    let err = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect_err("install failure should fail the run");

    assert_eq!(err.stage, WorkflowStage::DeployOrLaunch);
    assert!(matches!(
        err.source,
        RunnerError::DeployFailed {
            step: "install",
            exit_code: Some(22),
            ..
        }
    ));
    assert!(!runner
        .command_lines()
        .iter()
        .any(|line| line.starts_with("xcrun simctl launch")));
}

#[tokio::test]
async fn continue_policy_reports_failures_and_finishes() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new().respond(
        "xcrun simctl install",
        CommandOutput::failure(22, "An application bundle was not found"),
    ));
    let chooser = ScriptedChooser::new().answer("App").answer("iPhone 15");
    let mut config = simctl_config();
    config.workflow.deploy_failure = DeployFailurePolicy::Continue;

    let summary = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect("continue policy should finish");

    let statuses: Vec<bool> = summary
        .deploy
        .outcomes
        .iter()
        .map(|outcome| outcome.status == StepStatus::Succeeded)
        .collect();
    assert_eq!(statuses, vec![true, false, true]);
}

#[tokio::test]
async fn unknown_device_name_fails_device_selection() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new());
    let chooser = ScriptedChooser::new().answer("App");
    let config = simctl_config();

    let err = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions {
            scheme: None,
            device: Some("iPhone 14".into()),
        },
    )
    .run()
    .await
    .expect_err("unavailable device should not resolve");

    assert_eq!(err.stage, WorkflowStage::SelectDevice);
    assert!(matches!(err.source, RunnerError::DeviceNotFound { ref name } if name == "iPhone 14"));
}

#[tokio::test]
async fn named_scheme_must_be_listed() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new());
    let chooser = ScriptedChooser::new();
    let config = simctl_config();

    let err = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions {
            scheme: Some("AppTests".into()),
            device: None,
        },
    )
    .run()
    .await
    .expect_err("unshared scheme should be rejected");

    assert_eq!(err.stage, WorkflowStage::SelectScheme);
    assert!(matches!(err.source, RunnerError::SchemeNotFound { .. }));
}

#[tokio::test]
async fn project_without_schemes_stops_before_listing_devices() {
    let dir = project_dir();
    let runner = ScriptedCommandRunner::new().respond(
        "xcodebuild -project App.xcodeproj -list",
        CommandOutput::success(fixture("xcodebuild_list_no_schemes.txt")),
    );
    let chooser = ScriptedChooser::new();
    let config = simctl_config();

    let err = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect_err("no schemes should fail");

    assert_eq!(err.stage, WorkflowStage::ListSchemes);
    assert!(matches!(err.source, RunnerError::NoSchemesFound));
    assert_eq!(runner.command_lines().len(), 1);
}

#[tokio::test]
async fn cancelled_prompt_aborts_the_run() {
    let dir = project_dir();
    let runner = with_simulator_defaults(ScriptedCommandRunner::new());
    let chooser = ScriptedChooser::new().cancel();
    let config = simctl_config();

    let err = Workflow::new(
        &runner,
        &chooser,
        &config,
        dir.path(),
        WorkflowOptions::default(),
    )
    .run()
    .await
    .expect_err("cancel should abort");

    assert_eq!(err.stage, WorkflowStage::SelectScheme);
    assert!(matches!(err.source, RunnerError::SelectionAborted { .. }));
}
