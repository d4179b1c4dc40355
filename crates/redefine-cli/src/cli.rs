use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "redefine",
    about = "Redefine: replay AMD dependency-substitution scenarios without a module loader",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a scenario and print the exports it reads
    Run {
        /// Path to a scenario document (.toml, otherwise JSON)
        scenario: String,

        /// Binding name to read (repeatable; defaults to the scenario's list)
        #[arg(long = "export")]
        exports: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a scenario and print the queue, registry, and cache
    Debug {
        /// Path to a scenario document (.toml, otherwise JSON)
        scenario: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
