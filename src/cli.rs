//! Command-line interface definition.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfmeld")]
#[command(about = "Merge multiple PDF files into one", long_about = None)]
pub struct Cli {
    /// Input PDF paths or glob patterns to merge (in order)
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Output PDF file path; a unique temp file is generated when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not open the merged PDF in a viewer
    #[arg(long)]
    pub no_open: bool,

    /// Print the merge report as JSON
    #[arg(long)]
    pub json: bool,

    /// Only print the output path on success
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inputs_in_order() {
        let cli = Cli::parse_from(["pdfmeld", "a.pdf", "b.pdf", "-o", "out.pdf"]);
        assert_eq!(cli.inputs, vec!["a.pdf", "b.pdf"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.pdf")));
        assert!(!cli.no_open);
    }

    #[test]
    fn output_is_optional() {
        let cli = Cli::parse_from(["pdfmeld", "a.pdf", "--no-open", "--json"]);
        assert_eq!(cli.output, None);
        assert!(cli.no_open);
        assert!(cli.json);
    }
}
