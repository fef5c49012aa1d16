use crate::commands::{handle, hasura, schema};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tzindex_lib::config::IndexerArgs;

#[derive(Parser, Debug)]
#[clap(
    name = "tzindex",
    about = "Tezos indexer packages and Hasura tooling",
    version,
    rename_all = "kebab-case"
)]
pub struct Opt {
    #[clap(subcommand)]
    command: Tzindex,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
pub enum Tzindex {
    /// Hasura metadata for the package's tables.
    #[clap(subcommand)]
    Hasura(HasuraCommand),

    /// Database schema for the package's models.
    #[clap(subcommand)]
    Schema(SchemaCommand),

    /// Run the package's handlers over decoded operations.
    Handle(HandleCommand),
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
pub enum HasuraCommand {
    /// Print the generated metadata document.
    Generate(GenerateCommand),

    /// Merge the generated metadata into the Hasura instance.
    Configure(IndexerArgs),
}

#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Views to track alongside the model tables.
    #[clap(long, value_delimiter = ',')]
    pub views: Vec<String>,

    #[clap(flatten)]
    pub args: IndexerArgs,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// Create the schema and one table per model.
    Init(IndexerArgs),
}

#[derive(Debug, Args)]
pub struct HandleCommand {
    /// JSON file holding one operation or an array of operations.
    #[clap(value_name = "OPERATION")]
    pub operation: PathBuf,

    /// Apply to an in-memory store and print the resulting rows.
    #[clap(long)]
    pub dry_run: bool,

    #[clap(flatten)]
    pub args: IndexerArgs,
}

pub async fn run_cli() -> anyhow::Result<()> {
    let opt = Opt::try_parse();

    match opt {
        Ok(opt) => match opt.command {
            Tzindex::Hasura(HasuraCommand::Generate(command)) => {
                hasura::generate(command).await
            }
            Tzindex::Hasura(HasuraCommand::Configure(args)) => {
                hasura::configure(args).await
            }
            Tzindex::Schema(SchemaCommand::Init(args)) => schema::init(args).await,
            Tzindex::Handle(command) => handle::exec(command).await,
        },
        Err(e) => {
            // Prints the error and exits.
            e.exit()
        }
    }
}
