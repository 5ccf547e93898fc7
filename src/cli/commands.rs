use crate::cli::args::{Cli, Commands};
use crate::config::Config;
use crate::language::ast::{Program, Statement};
use crate::language::examples::{default_file_name, write_example};
use crate::language::format::format_source;
use crate::runtime::{RunStatus, Sandbox, StreamingSink};
use crate::transpiler::{self, parser, validation};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.verbose {
        println!("NanoLang v{}", env!("CARGO_PKG_VERSION"));
    }

    match cli.command {
        Commands::Parse { input, json } => parse_command(&input, json, cli.verbose),
        Commands::Transpile { input, output } => {
            transpile_command(&input, output.as_deref(), cli.verbose)
        }
        Commands::Run {
            input,
            js,
            show_code,
            json,
            strict,
            max_steps,
            timeout_ms,
            config,
        } => {
            let config = load_config(config.as_deref(), max_steps, timeout_ms)?;
            let options = RunOptions {
                js,
                show_code,
                json,
                strict,
            };
            run_command(&input, &options, &config, cli.verbose)
        }
        Commands::Check { input, json } => check_command(&input, json, cli.verbose),
        Commands::Fmt { input, in_place } => fmt_command(&input, in_place, cli.verbose),
        Commands::New {
            name,
            output,
            template,
        } => new_command(&name, output.as_deref(), &template, cli.verbose),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))
}

fn load_config(path: Option<&Path>, max_steps: Option<u64>, timeout_ms: Option<u64>) -> Result<Config> {
    let base = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut config = base.with_lookup(|key| std::env::var(key).ok());

    if let Some(steps) = max_steps {
        config.max_steps = (steps > 0).then_some(steps);
    }
    if let Some(ms) = timeout_ms {
        config.timeout_ms = (ms > 0).then_some(ms);
    }

    log::debug!("runner configuration: {:?}", config);
    Ok(config)
}

fn parse_command(input: &Path, json: bool, verbose: bool) -> Result<()> {
    if verbose {
        println!("🔍 Parsing NanoLang file: {}", input.display());
    }

    let source = read_source(input)?;
    let program = parser::parse_source(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&program.lines)?);
        return Ok(());
    }

    println!("✅ Parsed {} statement(s)", program.len());
    display_program_summary(&program);
    println!("\n--- Structure ---");
    print!("{}", program.to_tree_string());

    Ok(())
}

fn transpile_command(input: &Path, output: Option<&Path>, verbose: bool) -> Result<()> {
    if verbose {
        println!("🔧 Transpiling NanoLang file: {}", input.display());
    }

    let source = read_source(input)?;
    let code = transpiler::transpile(&source);

    match output {
        Some(path) => {
            let mut contents = code;
            contents.push('\n');
            fs::write(path, contents)?;
            println!("✅ Generated JavaScript in {}", path.display());
        }
        None => println!("{}", code),
    }

    Ok(())
}

struct RunOptions {
    js: bool,
    show_code: bool,
    json: bool,
    strict: bool,
}

fn run_command(input: &Path, options: &RunOptions, config: &Config, verbose: bool) -> Result<()> {
    if verbose {
        let language = if options.js { "JavaScript" } else { "NanoLang" };
        println!("🚀 Running {}: {}", language, input.display());
    }

    let source = read_source(input)?;
    if options.strict && !options.js {
        validation::validate_program(&parser::parse_source(&source))
            .with_context(|| format!("{} did not pass strict checks", input.display()))?;
    }
    let code = if options.js {
        source
    } else {
        transpiler::transpile(&source)
    };

    if options.show_code {
        println!("--- Generated JavaScript ---");
        println!("{}", code);
        println!("--- Output ---");
    }

    let sandbox = Sandbox::new(config.limits());

    if options.json {
        let report = sandbox.run(&code);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut sink = StreamingSink::new(|line: &str| println!("{}", line));
    let (status, steps) = sandbox.run_with_sink(&code, &mut sink);
    if sink.captured() == 0 {
        println!("{}", config.no_output_placeholder);
    }

    if verbose {
        let outcome = match &status {
            RunStatus::Completed => "completed",
            RunStatus::RuntimeError { .. } => "stopped by a runtime error",
            RunStatus::SystemError { .. } => "rejected before execution",
        };
        println!("⏱️ Run {} after {} step(s)", outcome, steps);
    }

    Ok(())
}

fn check_command(input: &Path, json: bool, verbose: bool) -> Result<()> {
    if verbose {
        println!("🔍 Checking NanoLang file: {}", input.display());
    }

    let source = read_source(input)?;
    let findings = validation::check_source(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        for finding in &findings {
            println!("⚠️  {}", finding);
        }
    }

    if findings.is_empty() {
        if !json {
            println!("✅ No problems found");
        }
        Ok(())
    } else {
        Err(anyhow!("{} problem(s) found in {}", findings.len(), input.display()))
    }
}

fn fmt_command(input: &Path, in_place: bool, verbose: bool) -> Result<()> {
    if verbose {
        println!("🎨 Formatting NanoLang file: {}", input.display());
    }

    let source = read_source(input)?;
    let formatted = format_source(&source);

    if in_place {
        fs::write(input, formatted)?;
        println!("✅ Formatted file in place: {}", input.display());
    } else {
        print!("{}", formatted);
    }

    Ok(())
}

fn new_command(name: &str, output: Option<&Path>, template: &str, verbose: bool) -> Result<()> {
    if verbose {
        println!("🏗️ Creating NanoLang program '{}' from template '{}'", name, template);
    }

    let output_file = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_file_name(name));

    let written = write_example(template, name, &output_file)?;

    println!("✅ Created new program: {}", written.display());
    println!("📝 Run it with: nano run {}", written.display());

    Ok(())
}

fn display_program_summary(program: &Program) {
    let prints = program.count_where(|s| matches!(s, Statement::Print { .. }));
    let assignments = program.count_where(|s| matches!(s, Statement::Assign { .. }));
    let loops = program.count_where(|s| matches!(s, Statement::RepeatBegin { .. }));
    let checks = program.count_where(|s| matches!(s, Statement::CheckBegin { .. }));
    let unknown = program.count_where(|s| {
        matches!(s, Statement::Unrecognized { .. } | Statement::DanglingSet { .. })
    });

    println!("💬 Prints: {}", prints);
    println!("📦 Assignments: {}", assignments);
    println!("🔁 Loops: {}", loops);
    println!("❓ Checks: {}", checks);
    if unknown > 0 {
        println!("⚠️  Unrecognized: {}", unknown);
    }
}
