use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fastlink")]
#[command(about = "Manage 123 cloud-drive instant-link collections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a link and list the files it carries
    #[command(alias = "p")]
    Parse {
        /// The link text (reads stdin when omitted)
        link: Option<String>,
    },

    /// Generate a link from a JSON document
    #[command(alias = "gen")]
    Generate {
        /// Document to encode
        file: PathBuf,
    },

    /// Check a link's structure without fully parsing it
    Validate {
        /// The link text
        link: String,
    },

    /// Merge JSON documents into one (first occurrence of a path wins)
    Merge {
        /// Documents to merge; a directory expands to its .json files
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output document
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Sort a document by path, or by natural display order
    Sort {
        /// Document to sort in place
        file: PathBuf,

        /// Natural order: flat files first, digit runs compared as numbers
        #[arg(long)]
        natural: bool,
    },

    /// Split a document into chunks of at most N files
    SplitCount {
        /// Document to split
        file: PathBuf,

        /// Maximum files per chunk
        #[arg(short = 'n', long)]
        size: usize,

        /// Output directory (defaults to the document's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a document by directory depth
    SplitFolder {
        /// Document to split
        file: PathBuf,

        /// Number of leading directory segments to group by
        #[arg(short, long)]
        level: usize,

        /// Output directory (defaults to the document's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Drop files matching the given extensions
    FilterExt {
        /// Document to filter
        file: PathBuf,

        /// Extensions to exclude, without the dot (e.g. txt nfo)
        #[arg(required = true, num_args = 1..)]
        extensions: Vec<String>,

        /// Output document
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show structure stats and a directory tree
    Info {
        /// Document to analyze
        file: PathBuf,
    },

    /// List the two-level directory filter options
    Dirs {
        /// Document to index
        file: PathBuf,

        /// Show only records under this selector (e.g. music or music/rock)
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Batch-import links from a text file into a document
    Ingest {
        /// Text file with one link per line ("-" for stdin)
        links: PathBuf,

        /// Target document (created if missing)
        #[arg(short, long)]
        into: PathBuf,
    },
}
