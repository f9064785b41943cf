use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development tasks for gb-present")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// fmt check, clippy, build and every test
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy,
    /// Run tests, optionally narrowed to one group
    Test {
        #[arg(long, value_enum)]
        only: Option<TestGroup>,
    },
    /// Run criterion benchmarks
    Bench {
        /// Only benchmarks whose name contains this
        filter: Option<String>,
    },
    /// Present a ROM with the built-in core
    Run {
        rom_path: String,
        #[arg(long)]
        release: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TestGroup {
    /// Frame, atlas, conversion, geometry and context helpers
    Display,
    /// Frame pump, config and tile viewer units
    Emulator,
    /// Everything under tests/
    Integration,
    /// Doc examples
    Doc,
}

impl TestGroup {
    fn cargo_args(self) -> &'static [&'static str] {
        match self {
            TestGroup::Display => &["test", "--lib", "display"],
            TestGroup::Emulator => &["test", "--lib", "emulator"],
            TestGroup::Integration => &["test", "--tests"],
            TestGroup::Doc => &["test", "--doc"],
        }
    }
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Task::Ci => ci(),
        Task::Fmt { check } => cargo(&fmt_args(check)),
        Task::Clippy => cargo(CLIPPY),
        Task::Test { only } => cargo(only.map_or(&["test"][..], TestGroup::cargo_args)),
        Task::Bench { filter } => {
            let mut args = vec!["bench"];
            if let Some(filter) = filter.as_deref() {
                args.push(filter);
            }
            cargo(&args)
        }
        Task::Run { rom_path, release } => run(&rom_path, release),
    }
}

const CLIPPY: &[&str] = &["clippy", "--all-targets", "--", "-D", "warnings"];

fn fmt_args(check: bool) -> Vec<&'static str> {
    let mut args = vec!["fmt", "--all"];
    if check {
        args.extend(["--", "--check"]);
    }
    args
}

/// Stages `ci` runs, in order
fn ci_stages() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("fmt", fmt_args(true)),
        ("clippy", CLIPPY.to_vec()),
        ("build", vec!["build", "--all-targets"]),
        ("test", vec!["test"]),
    ]
}

fn ci() -> Result<()> {
    let started = Instant::now();

    for (name, args) in ci_stages() {
        println!("{} {}", "▶".blue().bold(), name.bold());
        cargo(&args).with_context(|| format!("ci stage '{}' failed", name))?;
    }

    println!(
        "{} ci passed in {:.1}s",
        "✓".green().bold(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn is_rom_name(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".gb") || lower.ends_with(".gbc")
}

fn run(rom_path: &str, release: bool) -> Result<()> {
    if !Path::new(rom_path).is_file() {
        bail!("no ROM at '{}'", rom_path);
    }
    if !is_rom_name(rom_path) {
        println!("{} '{}' is not a .gb/.gbc file", "⚠".yellow().bold(), rom_path);
    }
    println!("{} Escape stops the presentation", "ℹ".blue());

    let mut args = vec!["run"];
    if release {
        args.push("--release");
    }
    args.extend(["--", rom_path]);
    cargo(&args)
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new(env!("CARGO"))
        .args(args)
        .status()
        .with_context(|| format!("failed to spawn cargo {}", args.join(" ")))?;

    if !status.success() {
        bail!("cargo {} exited with {}", args.join(" "), status);
    }
    Ok(())
}
