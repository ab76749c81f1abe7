mod commands;
mod output;

use clap::{Parser, Subcommand};
use invmap_core::config::Config;
use invmap_core::error::InvmapError;
use invmap_core::model::ReshapeMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "invmap",
    version,
    about = "Map invoice PDFs onto Excel templates with a vision model"
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract invoice data from PDF(s) and write xlsx + zip outputs
    Extract {
        /// Path(s) to invoice PDFs
        #[arg(required = true)]
        pdf_files: Vec<PathBuf>,

        /// Excel template whose header row defines the columns
        #[arg(short, long, value_name = "XLSX")]
        template: PathBuf,

        /// Reshape mode: flat (default) or split (summary + items)
        #[arg(short, long, default_value = "flat")]
        mode: ReshapeMode,

        /// File holding a sub prompt to use instead of the default
        #[arg(short, long, value_name = "FILE")]
        prompt: Option<PathBuf>,

        /// Directory for the workbook and bundle
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Run a saved model reply through the reshaping pipeline (offline)
    Reshape {
        /// File holding the raw model reply
        reply_file: PathBuf,

        /// Excel template whose header row defines the columns
        #[arg(short, long, value_name = "XLSX")]
        template: PathBuf,

        /// Reshape mode: flat (default) or split (summary + items)
        #[arg(short, long, default_value = "flat")]
        mode: ReshapeMode,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Also write the sheets to an xlsx workbook
        #[arg(long, value_name = "FILE")]
        xlsx: Option<PathBuf>,
    },
    /// Print the extraction sub prompt
    Prompt {
        /// Template to tailor the sub prompt to (with --regenerate)
        #[arg(short, long, value_name = "XLSX")]
        template: Option<PathBuf>,

        /// Ask the model for a sub prompt matching the template's columns
        #[arg(long, requires = "template")]
        regenerate: bool,
    },
    /// Show a template's columns and first rows
    Template {
        /// Path to the xlsx template
        file: PathBuf,

        /// Number of data rows to preview
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Extract {
            pdf_files,
            template,
            mode,
            prompt,
            out_dir,
            output,
        } => commands::extract::run(&config, pdf_files, &template, mode, prompt, &out_dir, &output),
        Commands::Reshape {
            reply_file,
            template,
            mode,
            output,
            xlsx,
        } => commands::reshape::run(&config, &reply_file, &template, mode, &output, xlsx),
        Commands::Prompt {
            template,
            regenerate,
        } => commands::prompt::run(&config, template.as_deref(), regenerate),
        Commands::Template { file, rows } => commands::template::run(&file, rows),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, InvmapError> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}
