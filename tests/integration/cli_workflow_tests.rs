use serde_json::json;

use crate::assert_command_success;
use crate::fixture::TestFixture;

#[test]
fn robot_plan_lifecycle() {
    let fixture = TestFixture::with_sample_project("robot_plan_lifecycle");
    assert_eq!(fixture.count_rows("projects"), 1);

    let output = fixture.run_takt(&["--robot", "generate", "tower-a"]);
    assert_command_success!(output);
    let json = output.json();
    assert_eq!(json["status"], "ok");
    let plan = &json["data"];
    assert_eq!(plan["name"], "Takt Plan v1");
    assert_eq!(plan["status"], "draft");
    assert_eq!(plan["generatedBy"], "template");
    let plan_id = plan["id"].as_str().unwrap().to_string();

    let output = fixture.run_takt(&["--robot", "list", "tower-a"]);
    assert_command_success!(output);
    let plans = output.json()["data"].clone();
    assert_eq!(plans.as_array().unwrap().len(), 1);
    assert_eq!(plans[0]["id"], plan_id.as_str());

    let output = fixture.run_takt(&["--robot", "activate", &plan_id]);
    assert_command_success!(output);
    assert_eq!(output.json()["data"]["status"], "active");

    let output = fixture.run_takt(&["--robot", "summary", &plan_id]);
    assert_command_success!(output);
    let summary = output.json()["data"].clone();
    assert_eq!(summary["status"], "active");
    assert_eq!(summary["totalDays"], 20);
    assert_eq!(summary["statusCounts"]["planned"], summary["totalAssignments"]);

    let output = fixture.run_takt(&["--robot", "flowline", &plan_id]);
    assert_command_success!(output);
    let flowline = output.json()["data"].clone();
    assert_eq!(flowline["planId"], plan_id.as_str());
    assert_eq!(flowline["startDate"], "2024-01-01");

    let output = fixture.run_takt(&["--robot", "show", &plan_id]);
    assert_command_success!(output);
    let shown = output.json()["data"].clone();
    assert_eq!(shown["id"], plan_id.as_str());
    assert_eq!(shown["status"], "active");

    assert_eq!(fixture.count_rows("takt_plans"), 1);
}

#[test]
fn human_output_renders_plan() {
    let fixture = TestFixture::with_sample_project("human_output_renders_plan");

    let output = fixture.run_takt(&["generate", "tower-a"]);
    assert_command_success!(output);
    assert!(output.stdout.contains("Takt Plan v1"));

    let output = fixture.run_takt(&["list", "tower-a"]);
    assert_command_success!(output);
    assert!(output.stdout.contains("Takt plans for tower-a"));
    assert!(output.stdout.contains("v1"));
}

#[test]
fn generate_twice_supersedes_on_activation() {
    let fixture = TestFixture::with_sample_project("generate_twice_supersedes_on_activation");

    let first = fixture.run_takt(&["--robot", "generate", "tower-a"]).json();
    let second = fixture.run_takt(&["--robot", "generate", "tower-a"]).json();
    assert_eq!(second["data"]["version"], 2);
    let first_id = first["data"]["id"].as_str().unwrap().to_string();
    let second_id = second["data"]["id"].as_str().unwrap().to_string();

    assert_command_success!(fixture.run_takt(&["--robot", "activate", &first_id]));
    assert_command_success!(fixture.run_takt(&["--robot", "activate", &second_id]));

    let plans = fixture.run_takt(&["--robot", "list", "tower-a", "--status", "superseded"]);
    assert_command_success!(plans);
    let data = plans.json()["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["id"], first_id.as_str());
}

#[test]
fn missing_plan_reports_structured_error() {
    let fixture = TestFixture::with_sample_project("missing_plan_reports_structured_error");

    let output = fixture.run_takt(&["--robot", "show", "no-such-plan"]);
    assert!(!output.success);
    assert_ne!(output.exit_code, 0);
    let json = output.json();
    let error = &json["status"]["error"];
    assert_eq!(error["code"], "PLAN_NOT_FOUND");
    assert_eq!(error["numeric_code"], 105);
    assert_eq!(error["category"], "precondition");
    assert!(error["message"].as_str().unwrap().contains("no-such-plan"));
}

#[test]
fn missing_project_human_error_goes_to_stderr() {
    let fixture = TestFixture::new("missing_project_human_error_goes_to_stderr");

    let output = fixture.run_takt(&["generate", "ghost"]);
    assert!(!output.success);
    assert!(output.stdout.is_empty());
    assert!(output.stderr.contains("E101"));
    assert!(output.stderr.contains("Hint:"));
}

#[test]
fn import_rejects_malformed_snapshot() {
    let fixture = TestFixture::new("import_rejects_malformed_snapshot");
    let path = fixture.write_json("broken.json", &json!({ "locations": [] }));

    let output = fixture.run_takt(&["--robot", "import", &path.display().to_string()]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "INVALID_INPUT");
}

#[test]
fn config_reports_layered_values() {
    let fixture = TestFixture::new("config_reports_layered_values");

    let output = fixture.run_takt(&["--robot", "config"]);
    assert_command_success!(output);
    let data = output.json()["data"].clone();
    assert_eq!(data["config"]["scheduler"]["default_takt_time"], 5);
    assert_eq!(data["config"]["server"]["bind"], "127.0.0.1:3000");
    assert_eq!(
        data["db_path"],
        fixture.db_path.display().to_string().as_str()
    );

    fixture.write_config("[scheduler]\ndefault_takt_time = 7\n");
    let output = fixture.run_takt(&["--robot", "config", "scheduler.default_takt_time"]);
    assert_command_success!(output);
    assert_eq!(output.json()["data"], 7);

    let output = fixture.run_takt_with_env(
        &["--robot", "config", "scheduler.default_takt_time"],
        &[("TAKT_DEFAULT_TAKT_TIME", "9")],
    );
    assert_command_success!(output);
    assert_eq!(output.json()["data"], 9);

    let output = fixture.run_takt(&["--robot", "config", "scheduler.nope"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "INVALID_INPUT");
}

#[test]
fn invalid_config_fails_before_running() {
    let fixture = TestFixture::new("invalid_config_fails_before_running");
    fixture.write_config("[scheduler]\nworking_days = []\n");

    let output = fixture.run_takt(&["--robot", "config"]);
    assert!(!output.success);
    assert_eq!(output.json()["status"]["error"]["code"], "EMPTY_WORK_WEEK");
}
