//! Visitsheet CLI - Turn attendance exports into grouped visit reports
//!
//! # Commands
//!
//! ```bash
//! visitsheet convert export.csv            # Write converted.csv + converted.xlsx
//! visitsheet convert export.csv -f zip     # Write converted_files.zip only
//! visitsheet inspect export.csv            # Print derived records as JSON
//! visitsheet serve                         # Start HTTP server (port 3000)
//! visitsheet remote export.csv -f xlsx     # Convert through a running server
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use visitsheet::api::ConvertClient;
use visitsheet::{convert_file, inspect_file, Artifact, ClientConfig, OutputFormat, ServerConfig};

#[derive(Parser)]
#[command(name = "visitsheet")]
#[command(about = "Turn tutoring attendance exports into grouped visit reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an attendance export into report files
    Convert {
        /// Input CSV export
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Single format to write: csv, xlsx or zip (default: csv and xlsx)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print the derived attendance records as JSON
    Inspect {
        /// Input CSV export
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: VISITSHEET_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert through a running visitsheet server
    Remote {
        /// Input CSV export
        input: PathBuf,

        /// Server base URL (default: VISITSHEET_API_URL)
        #[arg(long)]
        url: Option<String>,

        /// Format to request: csv, xlsx or zip
        #[arg(short, long, default_value = "zip")]
        format: OutputFormat,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            format,
        } => cmd_convert(&input, &output, format),

        Commands::Inspect { input, output } => cmd_inspect(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Remote {
            input,
            url,
            format,
            output,
        } => cmd_remote(&input, url, format, &output).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output_dir: &Path,
    format: Option<OutputFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let result = convert_file(input)?;

    eprintln!("\n📊 Summary:");
    eprintln!("   Rows read: {}", result.csv_info.row_count);
    eprintln!("   Records: {}", result.record_count);
    eprintln!("   Subjects: {}", result.subject_count);
    eprintln!("   Sections: {}", result.section_count);
    eprintln!("   Visits: {}", result.total_visits);

    let formats = match format {
        Some(f) => vec![f],
        None => vec![OutputFormat::Csv, OutputFormat::Xlsx],
    };

    eprintln!();
    for f in formats {
        let artifact = result.render(f)?;
        write_artifact(output_dir, &artifact)?;
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Inspecting: {}", input.display());

    let records = inspect_file(input)?;
    eprintln!("   {} attendance records", records.len());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    visitsheet::server::start_server(config).await
}

async fn cmd_remote(
    input: &Path,
    url: Option<String>,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = match url {
        Some(url) => ConvertClient::new(url),
        None => ConvertClient::from_config(&ClientConfig::from_env()),
    };

    eprintln!("📤 Sending {} to {}", input.display(), client.base_url());

    let csv = fs::read(input)?;
    let bytes = client.convert(&csv, format).await?;

    let artifact = Artifact {
        file_name: format.file_name(),
        content_type: format.content_type(),
        bytes,
    };
    write_artifact(output_dir, &artifact)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact.file_name);
    fs::write(&path, &artifact.bytes)?;
    eprintln!("💾 Saved {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(path)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
