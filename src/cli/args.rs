use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nano",
    about = "NanoLang compiler and sandboxed runner",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a NanoLang file and show its statement structure
    Parse {
        /// Input NanoLang file to parse
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print classified statements as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transpile a NanoLang file to JavaScript
    Transpile {
        /// Input NanoLang file to transpile
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write the generated code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transpile and run a NanoLang file in the sandbox
    Run {
        /// Input file to run
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Treat the input as JavaScript and run it without transpiling
        #[arg(long)]
        js: bool,

        /// Print the code being executed before its output
        #[arg(long)]
        show_code: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Refuse to run a NanoLang file that `check` reports problems in
        #[arg(long)]
        strict: bool,

        /// Step budget for the run (0 disables it)
        #[arg(long)]
        max_steps: Option<u64>,

        /// Wall-clock budget in milliseconds (0 disables it)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// JSON configuration file
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Report lines the transpiler would drop, misread, or leave unbalanced
    Check {
        /// Input NanoLang file to check
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Format a NanoLang file
    Fmt {
        /// Input NanoLang file to format
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write formatted output back to file
        #[arg(long)]
        in_place: bool,
    },

    /// Create a new NanoLang program from a bundled example
    New {
        /// Name of the program
        #[arg(value_name = "PROGRAM_NAME")]
        name: String,

        /// Output file for the program
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Example to start from (hello, variables, loops, logic)
        #[arg(short, long, default_value = "hello")]
        template: String,
    },
}
