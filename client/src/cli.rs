use {
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Cli {
    /// Path to the config file. Defaults to `ironbox.json5` in the user config directory.
    #[clap(long)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Check that the IronBox API answers.
    Ping,
    /// Encrypt a local file and upload it to the configured container.
    Upload {
        local_path: PathBuf,
        /// Name of the blob. Defaults to the file name.
        blob_name: Option<String>,
    },
    /// Encrypt a local file without uploading it.
    Encrypt {
        input: PathBuf,
        output: PathBuf,
        /// Base64 symmetric key.
        #[clap(long)]
        key: String,
        /// Base64 initialization vector.
        #[clap(long)]
        iv: String,
        /// 1 for AES-128, 2 for AES-256.
        #[clap(long, default_value_t = 2)]
        key_strength: i64,
    },
}
