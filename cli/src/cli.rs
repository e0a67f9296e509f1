use std::path::PathBuf;

use districter::Contiguity;

/// Greedy density-driven districting CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "districter", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Partition units into districts and write the assignment
    Run(RunArgs),

    /// Partition the same units for several district counts in parallel
    Batch(BatchArgs),
}

/// Unit input and the run options shared by every command.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Unit file (.geojson, .json or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub units: PathBuf,

    /// JSON config file; flags given on the command line take precedence
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Delimited population table joined to the units by id
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub population: Option<PathBuf>,

    /// Field separator of the population table (defaults to tab)
    #[arg(long)]
    pub separator: Option<char>,

    /// Adjacency rule: rook (shared edge) or queen (shared edge or vertex)
    #[arg(short, long)]
    pub contiguity: Option<Contiguity>,

    /// Do not absorb holes and exclaves cut off by district growth
    #[arg(long)]
    pub no_hole_filler: bool,

    /// Id property (GeoJSON) or id column (population table)
    #[arg(long)]
    pub id_field: Option<String>,

    /// Id attribute of shapefile records
    #[arg(long)]
    pub shape_id_field: Option<String>,

    /// Population property, attribute or column
    #[arg(long)]
    pub population_field: Option<String>,

    /// Land area property, attribute or column
    #[arg(long)]
    pub area_field: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of districts
    #[arg(short, long)]
    pub districts: Option<u32>,

    /// Output assignment CSV, defaults to "./assignments.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write unit geometry annotated with districts as GeoJSON
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub geojson: Option<PathBuf>,

    /// Also write a per-district JSON summary
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub summary: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of districts; repeat for several runs (-d 4 -d 8)
    #[arg(short, long, required = true)]
    pub districts: Vec<u32>,

    /// Output directory for one assignments_<N>.csv per district count
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Overwrite existing output files
    #[arg(short, long)]
    pub force: bool,
}
