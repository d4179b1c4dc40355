use crate::support::{exit_with, load_scenario_or_exit, print_json};
use serde_json::json;
use tracing::info;

pub fn run(scenario_path: String, exports: Vec<String>, json_output: bool) {
    let scenario = load_scenario_or_exit(&scenario_path);
    let report = scenario.run(&exports).unwrap_or_else(|e| exit_with(e));
    info!(
        scenario = %scenario_path,
        exports = report.exports.len(),
        "scenario resolved"
    );

    if json_output {
        print_json(&json!({
            "scenario": scenario_path,
            "exports": report.exports,
        }));
    } else {
        println!("redefine run");
        println!("  Scenario: {scenario_path}");
        println!("  Declared: {}", report.debug.queue.len());
        println!("  Claimed: {}", report.debug.count);
        for (name, value) in &report.exports {
            println!("  {name}: {value}");
        }
    }
}
