//! Command-line argument parsing

use clap::{Parser, Subcommand};

use crate::core::codec::ValueFormat;
use crate::core::ident::Ident;

#[derive(Parser, Debug, Clone)]
#[clap(name = "gatt-session", version)]
#[clap(about = "GATT client session for a single Bluetooth LE peripheral")]
pub struct CliArgs {
    /// Exact advertised device name to select
    #[clap(long)]
    pub name: Option<String>,

    /// Advertised device name prefix to select
    #[clap(long)]
    pub name_prefix: Option<String>,

    /// Service the device must offer (repeatable, resolved at connect time)
    #[clap(short, long = "service")]
    pub services: Vec<Ident>,

    /// Service usable after connecting without filtering on it (repeatable)
    #[clap(long = "optional-service")]
    pub optional_services: Vec<Ident>,

    /// JSON connection profile; command-line filters extend it
    #[clap(short, long)]
    pub profile: Option<String>,

    /// Log underlying error details for failed operations
    #[clap(long)]
    pub debug: bool,

    #[clap(subcommand)]
    pub command: Command,
}

/// Operation to perform once connected
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect and print the device identity
    Info,

    /// Read a characteristic value
    Read {
        /// Service identifier (UUID or hex alias)
        #[clap(long)]
        service: Ident,

        /// Characteristic identifier (UUID or hex alias)
        #[clap(long)]
        characteristic: Ident,

        /// Output representation
        #[clap(long, default_value = "raw")]
        format: ValueFormat,
    },

    /// Write a hex payload to a characteristic
    Write {
        /// Service identifier (UUID or hex alias)
        #[clap(long)]
        service: Ident,

        /// Characteristic identifier (UUID or hex alias)
        #[clap(long)]
        characteristic: Ident,

        /// Hex-encoded payload, e.g. 02024ad007
        #[clap(long)]
        value: String,
    },
}
