use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Copy every record from the source table into the target table.
    Run {
        /// Path to the TOML job file.
        #[arg(short, long)]
        config: String,
    },

    /// Parse the job file and print the effective configuration without
    /// resolving credentials or touching either table.
    Validate {
        /// Path to the TOML job file.
        #[arg(short, long)]
        config: String,
    },
}
