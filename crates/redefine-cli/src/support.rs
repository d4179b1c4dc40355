use redefine_kernel::Scenario;
use std::fmt::Display;

pub fn load_scenario_or_exit(path: &str) -> Scenario {
    Scenario::load(path).unwrap_or_else(|e| exit_with(e))
}

pub fn exit_with(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization")
    );
}
