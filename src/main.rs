//! flatbook - EPUB to simplified HTML converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "flatbook")]
#[command(version, about = "Flatten an EPUB into a single simplified HTML page", long_about = None)]
#[command(after_help = "EXAMPLES:
    flatbook book.epub          Write book/index.html and book/image/
    flatbook book.epub out      Write out/index.html and out/image/")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (defaults to the input path minus its .epub suffix)
    #[arg(value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let out_dir = cli
        .output
        .unwrap_or_else(|| flatbook::default_out_dir(&cli.input));

    match flatbook::convert(&cli.input, &out_dir) {
        Ok(conversion) => {
            for warning in &conversion.warnings {
                eprintln!("warning: {warning}");
            }
            if !cli.quiet {
                println!("Wrote output HTML to: {}", conversion.html_path.display());
                println!("(To view the file, open it in a web browser!)");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
