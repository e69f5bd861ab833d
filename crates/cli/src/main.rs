use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use pyevm_codegen::{disasm::format_listing, gas::GasReport};
use pyevm_compiler::{Compilation, CompilerConfig, MappingLayout, Transpiler};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pyevm")]
#[command(about = "Python contract to EVM bytecode compiler", long_about = None)]
#[command(version)]
struct Cli {
    /// Input file (use '-' or omit for stdin)
    input: Option<PathBuf>,

    /// Fail on constructs that would otherwise compile to a default
    #[arg(long)]
    strict: bool,

    /// Storage addressing for mapping entries
    #[arg(long, default_value_t = MappingLayout::Additive)]
    mapping_layout: MappingLayout,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Artifact)]
    emit: Emit,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Emit {
    /// JSON artifact: bytecode, ABI and metadata
    Artifact,
    /// Init and runtime code as hex
    Bytecode,
    /// Runtime code as hex
    Runtime,
    /// JSON ABI
    Abi,
    /// Analyzed contract model
    Model,
    /// Disassembly of both segments
    Asm,
    /// Static gas breakdown
    Gas,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.to_str() != Some("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn render(emit: Emit, compilation: &Compilation) -> anyhow::Result<String> {
    let artifact = &compilation.artifact;
    let assembled = &compilation.assembled;
    Ok(match emit {
        Emit::Artifact => artifact.to_json_pretty()?,
        Emit::Bytecode => artifact.bytecode.clone(),
        Emit::Runtime => artifact.deployed_bytecode.clone(),
        Emit::Abi => serde_json::to_string_pretty(&artifact.abi)?,
        Emit::Model => compilation.model.to_string(),
        Emit::Asm => format!(
            "; init\n{}\n; runtime\n{}",
            format_listing(&assembled.init),
            format_listing(&assembled.runtime)
        ),
        Emit::Gas => GasReport::from_bytecode(&assembled.bytecode()).format_report(),
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let source = read_input(cli.input.as_deref())?;

    let config = CompilerConfig { strict: cli.strict, mapping_layout: cli.mapping_layout };
    let compilation = Transpiler::new(config).compile(&source).map_err(|err| {
        let rendered = err.render(&source);
        // `main` adds the prefix back
        let message = rendered.strip_prefix("error: ").unwrap_or(&rendered).trim_end();
        anyhow::Error::msg(message.to_owned())
    })?;

    let mut output = render(cli.emit, &compilation)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
