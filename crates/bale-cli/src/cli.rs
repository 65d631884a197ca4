use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bale",
    about = "Stage software artifacts and record them on a supply-chain ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Mark this directory as a bale working directory
    Init(InitArgs),
    /// Stage files, a directory tree, or a URL
    Add(AddArgs),
    /// Create, select, or list envelopes
    Envelope(EnvelopeArgs),
    /// Show the staging area, or view individual records
    Status(StatusArgs),
    /// Push staged records to the ledger node
    Push(PushArgs),
    /// Drop records from the staging area
    Remove(RemoveArgs),
    /// Find and adopt a live ledger node for this network
    Synch(SynchArgs),
    /// Check that a node is answering
    Ping(PingArgs),
    /// Define and look up aliases for long identifiers
    Alias(AliasArgs),
    /// Get or set configuration values
    Config(ConfigArgs),
    /// Show the assigned network, or list the registered ones
    Network(NetworkArgs),
    /// Show or set the part staged records belong to
    Part(PartArgs),
    /// Show version and origin information
    About(AboutArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct AddArgs {
    /// Files or URLs to stage
    pub paths: Vec<String>,
    /// Mark the staged records as OpenChain-certified
    #[arg(long)]
    pub openchain: bool,
    /// Stage a whole directory tree as an envelope
    #[arg(long, value_name = "DIR", conflicts_with = "url")]
    pub dir: Option<String>,
    /// Stage a remote artifact by its URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

#[derive(Args)]
pub struct EnvelopeArgs {
    /// Create a named envelope and make it the default
    #[arg(long, value_name = "NAME")]
    pub create: Option<String>,
    /// Mark the created envelope as OpenChain-certified
    #[arg(long)]
    pub openchain: bool,
    /// Make an already-staged envelope the default
    #[arg(long, value_name = "ID", conflicts_with = "create")]
    pub set: Option<String>,
    /// List staged envelopes
    #[arg(short, long)]
    pub list: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Show full details for the given records instead of the table
    #[arg(long, value_name = "ID", num_args = 1..)]
    pub view: Vec<String>,
}

#[derive(Args)]
pub struct PushArgs {}

#[derive(Args)]
pub struct RemoveArgs {
    /// Staging ids (or UUIDs) to drop
    pub ids: Vec<String>,
    /// Clear the whole staging area
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct SynchArgs {}

#[derive(Args)]
pub struct PingArgs {
    /// Ping the atlas directory instead of the ledger node
    #[arg(long)]
    pub atlas: bool,
    /// Ping this address instead of the configured one
    #[arg(long, value_name = "ADDR", conflicts_with = "atlas")]
    pub address: Option<String>,
}

#[derive(Args)]
pub struct AliasArgs {
    /// Define an alias: --set <alias> <value>
    #[arg(long, num_args = 2)]
    pub set: Option<Vec<String>>,
    /// Print the value an alias maps to
    #[arg(long, value_name = "ALIAS")]
    pub get: Option<String>,
    /// List every defined alias
    #[arg(short, long)]
    pub list: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Show every local and global setting
    #[arg(long)]
    pub list: bool,
    /// Get or set a workspace setting: --local <key> [value]
    #[arg(long, num_args = 1..=2)]
    pub local: Option<Vec<String>>,
    /// Get or set a user-level setting: --global <key> [value]
    #[arg(long, num_args = 1..=2, conflicts_with = "local")]
    pub global: Option<Vec<String>>,
}

#[derive(Args)]
pub struct NetworkArgs {
    /// List the network spaces the atlas directory knows about
    #[arg(short, long)]
    pub list: bool,
}

#[derive(Args)]
pub struct PartArgs {
    /// Make this part the default for pushes
    #[arg(long, value_name = "UUID", conflicts_with = "get")]
    pub set: Option<String>,
    /// Fetch the part record from the ledger
    #[arg(long)]
    pub get: bool,
    /// Part to fetch; defaults to the configured one
    pub uuid: Option<String>,
}

#[derive(Args)]
pub struct AboutArgs {}
