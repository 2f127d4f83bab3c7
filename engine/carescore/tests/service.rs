use carescore::{
    CareScoreService, ImmuneBatchRequest, ImmuneRequest, NutritionRequest, ReportStatus,
    StoreConfig,
};
use carescore_immune::{ImmuneInput, RiskLevel, Source};
use carescore_nutrition::{NutritionKey, NutritionSource};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

const IMMUNE_BUNDLE: &str = r#"{
    "feature_names": ["AGE", "DISEASE_BURDEN", "FRAILTY_INDEX"],
    "model": {
        "kind": "tree_ensemble",
        "objective": "binary_logistic",
        "base_score": -1.5,
        "trees": [
            {"nodes": [
                {"feature": 0, "threshold": 80.0, "left": 1, "right": 2},
                {"value": 0.0},
                {"value": 0.8}
            ]},
            {"nodes": [
                {"feature": 1, "threshold": 1.5, "left": 1, "right": 2},
                {"value": 0.0},
                {"value": 1.2}
            ]}
        ]
    }
}"#;

const ALBUMIN_BUNDLE: &str = r#"{
    "feature_names": ["PROTEIN_INTAKE", "CKD"],
    "model": {"kind": "linear_regression", "coefficients": [0.004, -0.1], "intercept": 0.0}
}"#;

fn write_artifacts(root: &Path) {
    let dir = root.join("modeling").join("artifacts");
    fs::create_dir_all(&dir).expect("create dir");
    fs::write(dir.join("divs_immune_model_v7.json"), IMMUNE_BUNDLE).expect("immune");
    fs::write(dir.join("albumin_predictor_improved.json"), ALBUMIN_BUNDLE).expect("albumin");
    fs::write(
        dir.join("integrated_guidelines_v3.json"),
        r#"{"iron": {"baseline_hgb_increase": 1.2}}"#,
    )
    .expect("guidelines");
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[test]
fn full_artifact_set_serves_every_operation() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write_artifacts(tmp.path());
    let service = CareScoreService::open(StoreConfig::new(tmp.path()));

    let health = service.health();
    assert_eq!(health.status, ReportStatus::Ok);
    assert!(health.models.loaded.immune_model && health.models.loaded.albumin_model);
    assert!(health.models.errors.is_empty());

    let mut input = ImmuneInput::new(86.0);
    input.chf_yn = true;
    input.copd_yn = true;
    let result = service.predict_immune(Some("R-9".into()), &input);
    assert_eq!(result.source, Source::Model);
    let p = sigmoid(-1.5 + 0.8 + 1.2);
    assert_eq!(result.risk_probability, (p * 10_000.0).round() / 10_000.0);
    // p = sigmoid(0.5), immunity 37.75 with a neutral environment
    assert_eq!(result.risk_level, RiskLevel::High);

    let request: NutritionRequest = serde_json::from_value(serde_json::json!({
        "patient": {"age": 81, "sex": "F", "hemoglobin": 10.2},
        "intervention": {"iron_mg": 100, "protein_g": 75, "duration_weeks": 8}
    }))
    .expect("request");
    let sim = service.simulate_nutrition(&request.patient, &request.intervention);
    assert_eq!(sim.source, NutritionSource::MlRule);
    let albumin = &sim.results[&NutritionKey::Albumin];
    // 0.004 * 75 over 8 weeks (factor 2.0)
    assert!((albumin.expected_change.unwrap() - 0.6).abs() < 1e-9);
    let hgb = &sim.results[&NutritionKey::Hemoglobin];
    assert!((hgb.expected_change.unwrap() - 2.4).abs() < 1e-9);
}

#[test]
fn batch_preserves_order_and_ids() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let service = CareScoreService::open(StoreConfig::new(tmp.path()));
    let batch = ImmuneBatchRequest {
        items: (0..5)
            .map(|i| ImmuneRequest::new(Some(format!("R-{i}")), ImmuneInput::new(60.0 + 8.0 * i as f64)))
            .collect(),
    };
    let response = service.predict_immune_batch(&batch);
    assert_eq!(response.items.len(), 5);
    for (i, item) in response.items.iter().enumerate() {
        assert_eq!(item.resident_id.as_deref(), Some(format!("R-{i}").as_str()));
        assert_eq!(item.source, Source::Fallback);
    }
    assert!(response.items.windows(2).all(|w| w[0].risk_probability <= w[1].risk_probability));
}

#[test]
fn reload_reports_reloaded_status() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let service = CareScoreService::open(StoreConfig::new(tmp.path()));
    assert!(!service.health().models.loaded.immune_model);

    write_artifacts(tmp.path());
    let report = service.reload();
    assert_eq!(report.status, ReportStatus::Reloaded);
    assert!(report.models.loaded.immune_model);

    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["status"], "reloaded");
    assert_eq!(json["models"]["loaded"]["albumin_model"], true);
}

fn carescore() -> Command {
    Command::new(env!("CARGO_BIN_EXE_carescore"))
}

#[test]
fn cli_scores_a_request_file() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let request = tmp.path().join("resident.json");
    fs::write(&request, r#"{"resident_id": "B2", "features": {"age": 65, "gender": "M"}}"#)
        .expect("write");

    let output = carescore()
        .arg("--root")
        .arg(tmp.path())
        .arg("immune")
        .arg(&request)
        .output()
        .expect("run carescore");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["resident_id"], "B2");
    assert_eq!(value["source"], "fallback");
    assert_eq!(value["used_features"]["GENDER"], 1.0);
}

#[test]
fn cli_rejects_invalid_document() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let request = tmp.path().join("bad.json");
    fs::write(&request, r#"{"features": {"gender": "M"}}"#).expect("write");

    let output = carescore()
        .arg("--root")
        .arg(tmp.path())
        .arg("immune")
        .arg(&request)
        .output()
        .expect("run carescore");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: invalid request document"));
}

#[test]
fn cli_missing_file_is_an_io_failure() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let output = carescore()
        .arg("--root")
        .arg(tmp.path())
        .arg("batch")
        .arg(tmp.path().join("absent.json"))
        .output()
        .expect("run carescore");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_session_answers_each_line() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let mut child = carescore()
        .arg("--root")
        .arg(tmp.path())
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn carescore");
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(stdin, r#"{{"nutrition": {{"patient": {{"age": 70}}, "intervention": {{}}}}}}"#)
            .expect("write");
        writeln!(stdin, ":status").expect("write");
        writeln!(stdin, ":quit").expect("write");
    }
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    let sim: serde_json::Value = serde_json::from_str(lines[0]).expect("simulation json");
    assert_eq!(sim["source"], "rule-based");
    assert_eq!(sim["warnings"].as_array().map(Vec::len), Some(1));
    let status: serde_json::Value = serde_json::from_str(lines[1]).expect("status json");
    assert_eq!(status["status"], "ok");
    assert_eq!(status["models"]["errors"]["immune"], "immune artifact not found");
}
