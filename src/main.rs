use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use tsumiki::error::Severity;
use tsumiki::generator::sections::Section;
use tsumiki::{generate, BlockDocument, EmitterRegistry, GeneratorConfig};

#[derive(Parser)]
#[command(name = "tsumiki")]
#[command(author, version, about = "The Tsumiki block program code generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an Arduino sketch from a block document
    Generate {
        /// The block document (JSON) to generate from
        input: PathBuf,

        /// Output file (defaults to the input name with .ino)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Block library definition files (JSON, repeatable)
        #[arg(short = 'l', long = "library")]
        libraries: Vec<PathBuf>,

        /// Treat user-visible indexes as 1-based
        #[arg(long)]
        one_based_index: bool,

        /// Print the generated sketch to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Dump the populated sections to stdout
        #[arg(long)]
        dump_sections: bool,
    },

    /// Check a block document for problems without writing output
    Check {
        /// The block document (JSON) to check
        input: PathBuf,

        /// Block library definition files (JSON, repeatable)
        #[arg(short = 'l', long = "library")]
        libraries: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = match cli.command {
        Commands::Generate {
            input,
            output,
            libraries,
            one_based_index,
            stdout,
            dump_sections,
        } => generate_command(
            input,
            output,
            libraries,
            one_based_index,
            stdout,
            dump_sections,
        ),
        Commands::Check { input, libraries } => check_command(input, libraries),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// ドキュメントとライブラリ定義を読み込んでレジストリを準備する
fn load_inputs(
    input: &PathBuf,
    libraries: &[PathBuf],
) -> Result<(BlockDocument, EmitterRegistry)> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let document = BlockDocument::from_json(&text)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let mut registry = EmitterRegistry::with_builtins();
    for path in libraries {
        let definitions = tsumiki::load_definitions(path)
            .with_context(|| format!("failed to load library {}", path.display()))?;
        log::debug!("loaded {} definitions from {}", definitions.len(), path.display());
        for definition in definitions {
            registry.register_definition(definition);
        }
    }

    Ok((document, registry))
}

fn generate_command(
    input: PathBuf,
    output: Option<PathBuf>,
    libraries: Vec<PathBuf>,
    one_based_index: bool,
    stdout: bool,
    dump_sections: bool,
) -> Result<()> {
    let (document, registry) = load_inputs(&input, &libraries)?;

    let config = GeneratorConfig { one_based_index };

    if dump_sections {
        dump_sections_to_stdout(&document, &registry, config);
    }

    let program = generate(&document, &registry, config);
    report_diagnostics(&program.diagnostics);

    if stdout {
        print!("{}", program.code);
    } else {
        let output = output.unwrap_or_else(|| input.with_extension("ino"));
        fs::write(&output, &program.code)
            .with_context(|| format!("failed to write {}", output.display()))?;
        log::info!("wrote {}", output.display());
    }

    Ok(())
}

fn check_command(input: PathBuf, libraries: Vec<PathBuf>) -> Result<()> {
    let (document, registry) = load_inputs(&input, &libraries)?;

    let program = generate(&document, &registry, GeneratorConfig::default());
    report_diagnostics(&program.diagnostics);

    let errors = program
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("{} problem(s) found", errors);
    }

    println!("{}", "no problems found".green());
    Ok(())
}

/// 診断を深刻度つきで標準エラーへ出す
fn report_diagnostics(diagnostics: &[tsumiki::Diagnostic]) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        match &diagnostic.block_id {
            Some(id) => eprintln!("{}: {} [block {}]", severity, diagnostic.message, id),
            None => eprintln!("{}: {}", severity, diagnostic.message),
        }
    }
}

/// 生成パスをもう一度走らせ、セクションの中身を覗き見する
fn dump_sections_to_stdout(
    document: &BlockDocument,
    registry: &EmitterRegistry,
    config: GeneratorConfig,
) {
    use tsumiki::generator::{Context, GeneratorSession};

    let mut session = GeneratorSession::new(config);
    session.sections.reset();
    let mut ctx = Context::new(document, registry, &mut session);
    for root in &document.roots {
        let code = ctx.statement_chain(root, false);
        let code = code.trim_end();
        if !code.is_empty() {
            let _ = ctx
                .session
                .sections
                .add(Section::Loop, root.as_str().to_owned(), code, false);
        }
    }

    for section in Section::ALL {
        let fragments = session.sections.collect(section);
        if fragments.is_empty() {
            continue;
        }
        println!("=== {} ===", section.name());
        for fragment in fragments {
            println!("{}", fragment);
        }
    }
}
