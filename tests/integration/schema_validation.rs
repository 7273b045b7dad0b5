use jsonschema::validator_for;

use crate::common::{report_args, run_json, standard_tasks};
use test_support::{init_fixture_repo, tempdir};

fn compile_schema(name: &str) -> jsonschema::Validator {
  let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

#[test]
fn detailed_and_executive_json_conform_to_schema() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let missing = work.path().join("gone");
  let repos = format!("{},{}", repo.path().display(), missing.display());
  let compiled = compile_schema("work-report.schema.json");

  let detailed = run_json(&report_args(&repos, &tasks));
  compiled.validate(&detailed).expect("schema validation failed for detailed JSON");

  let mut args = report_args(&repos, &tasks);
  args.extend(["--report-type".to_string(), "executive".to_string()]);
  let executive = run_json(&args);
  compiled.validate(&executive).expect("schema validation failed for executive JSON");
  assert!(executive.get("tasks").is_none());
}
