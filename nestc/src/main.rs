use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nestc::config::{CompileContext, DEFAULT_MAX_NESTING};
use nestc::{Tokenizer, parse_file};

#[derive(Parser)]
#[command(name = "nestc")]
#[command(about = "Tokenizer and statement parser for the nest language", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every token of the first source file
    Tokens {
        /// Source files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Parse the first source file and print each statement's tree
    Parse {
        /// Source files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output artifact name
        #[arg(short, long, default_value = "out")]
        output: String,

        /// Deepest block nesting accepted
        #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
        max_nesting: usize,

        /// Print the raw AST instead of the tree view
        #[arg(long)]
        show_ast: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tokens { inputs } => {
            let context = CompileContext::new(inputs);
            for token in Tokenizer::open(&context)? {
                let token = token?;
                println!("{}\t{:?}\t{}", token.position(), token.kind(), token.text());
            }
        }
        Commands::Parse {
            inputs,
            output,
            max_nesting,
            show_ast,
        } => {
            let context = CompileContext::new(inputs)
                .with_output_name(output)
                .with_max_nesting(max_nesting);

            let mut failures = 0usize;
            for result in parse_file(&context)? {
                match result {
                    Ok(node) if show_ast => println!("{:#?}", node),
                    Ok(node) => println!("{}", node),
                    Err(e) => {
                        failures += 1;
                        eprintln!("error: {}", e);
                    }
                }
            }

            if failures > 0 {
                return Err(format!("{} statement(s) failed to parse", failures).into());
            }
        }
    }

    Ok(())
}
