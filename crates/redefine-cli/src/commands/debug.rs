use crate::support::{exit_with, load_scenario_or_exit, print_json};
use redefine_kernel::Harness;

pub fn run(scenario_path: String, json_output: bool) {
    let scenario = load_scenario_or_exit(&scenario_path);
    let harness = Harness::new();
    scenario.replay(&harness).unwrap_or_else(|e| exit_with(e));
    let snapshot = harness.debug();

    if json_output {
        print_json(&snapshot);
        return;
    }

    println!("redefine debug");
    println!("  Scenario: {scenario_path}");
    println!("  Count: {}/{}", snapshot.count, snapshot.queue.len());
    for (index, declaration) in snapshot.queue.iter().enumerate() {
        let id = declaration.id.as_deref().unwrap_or("anonymous");
        println!(
            "  [{index}] {id} {:?} ({:?})",
            declaration.dependencies, declaration.factory
        );
    }
    for (name, binding) in &snapshot.map {
        println!("  {name} -> [{}]", binding.declaration);
        for (dependency, value) in &binding.overrides {
            println!("    let {dependency} be {value} (exports)");
        }
        for (dependency, target) in &binding.links {
            println!("    let {dependency} be {target} (redefine)");
        }
    }
}
