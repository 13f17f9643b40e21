mod cmd;
mod output;
mod project;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_build, cmd_info, cmd_plan};
use output::{OutputFormat, Status, status};
use project::ProjectArgs;
use protogen_lib::invocation::CompileError;

/// protogen - Compile interface definitions into generated sources
#[derive(Parser)]
#[command(name = "protogen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile every definition file into the output root
  Build {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show the compiler invocation without running it
  Plan {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show the resolved compiler and well-known definitions
  Info {
    #[command(flatten)]
    project: ProjectArgs,
  },
}

fn main() {
  let cli = Cli::parse();

  init_tracing(cli.verbose);

  let result = match &cli.command {
    Commands::Build { project, format } => cmd_build(project, *format),
    Commands::Plan { project, format } => cmd_plan(project, *format),
    Commands::Info { project } => cmd_info(project),
  };

  if let Err(err) = result {
    status(Status::Failed, &format!("{:#}", err));
    std::process::exit(exit_code(&err));
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "protogen=debug,protogen_lib=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// The compiler's own status when it failed, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
  err
    .downcast_ref::<CompileError>()
    .and_then(CompileError::exit_code)
    .map(|code| code.clamp(1, 255))
    .unwrap_or(1)
}
