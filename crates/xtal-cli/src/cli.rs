use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "xtal - Bond inference, symmetry expansion and lattice transforms for crystal and molecular structures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress bars except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand symmetry, infer bonds and assign bond orders, then print the bond table.
    Bonds(BondsArgs),
    /// Replicate the structure over its replica range into a single P1 cell.
    Supercell(StructureArgs),
    /// Move every atom into the home cell and print the wrapped fractional positions.
    Wrap(StructureArgs),
    /// Turn every symmetry copy into an independent atom and print the P1 atom list.
    Desymmetrize(StructureArgs),
    /// Apply the cell's content shift and flip, then build the supercell.
    Shift(StructureArgs),
}

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct StructureArgs {
    /// Path to the structure description in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a TOML file overriding the bonding policy of the structure kind.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `bonds` subcommand.
#[derive(Args, Debug, Clone)]
pub struct BondsArgs {
    #[command(flatten)]
    pub structure: StructureArgs,

    /// Skip bond-order assignment and report untyped bonds.
    #[arg(long)]
    pub no_orders: bool,
}
