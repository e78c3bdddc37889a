//! Command-line interface for dumpfs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dumpfs")]
#[command(about = "dumpfs - a directory tree stored in a single file", long_about = None)]
pub struct Cli {
    /// Archive file (overrides the config file)
    #[arg(short, long, global = true)]
    pub archive: Option<PathBuf>,

    /// Config file (defaults to ./dumpfs.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize an empty archive, discarding any existing contents
    #[command(name = "i")]
    Init {
        /// Use the flat single-directory layout
        #[arg(long)]
        flat: bool,
    },

    /// Store a host file in the current directory
    #[command(name = "w")]
    Write {
        /// Host file to store
        name: PathBuf,
    },

    /// Extract a file from the current directory
    #[command(name = "r")]
    Read {
        /// File name in the current directory
        name: String,
    },

    /// List the current directory
    #[command(name = "l")]
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a directory
    Mkdir {
        /// Directory name or path
        name: String,
    },

    /// Change the current directory
    Cd {
        /// Directory path, relative or absolute
        path: String,
    },

    /// Print the current directory
    Pwd,
}
