pub mod cli;
pub mod config;

use {
    anyhow::{Context as _, Result, bail},
    base64::{Engine, prelude::BASE64_STANDARD},
    cli::{Cli, Command},
    config::{Config, default_log_filter},
    ironbox_protocol::{
        CipherSpec,
        endpoints::{EntityCredentials, EntityType},
    },
    ironbox_sdk::{
        client::{Client, ClientOptions, DEFAULT_ENDPOINT},
        crypto::PaddingFileEncrypter,
    },
    std::{
        io::{self, Write},
        path::{Path, PathBuf},
        sync::Mutex,
    },
    tracing::info,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _},
    url::Url,
};

#[inline]
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ping => {
            let client = init(cli.config)?;
            client.ping().await?;
            info!("IronBox API at {} is accessible", client.endpoint());
        }
        Command::Upload {
            local_path,
            blob_name,
        } => {
            let client = init(cli.config)?;
            let blob_name = match blob_name {
                Some(name) => name,
                None => local_path
                    .file_name()
                    .with_context(|| format!("cannot get file name of {local_path:?}"))?
                    .to_string_lossy()
                    .into_owned(),
            };
            client
                .upload_file_to_container(&local_path, &blob_name)
                .await
                .with_context(|| format!("failed to upload {local_path:?}"))?;
            info!("uploaded {local_path:?} as {blob_name:?}");
        }
        Command::Encrypt {
            input,
            output,
            key,
            iv,
            key_strength,
        } => {
            setup_logger(None, &default_log_filter())?;
            encrypt(&input, &output, &key, &iv, key_strength)?;
        }
    }
    Ok(())
}

/// Loads the config, starts logging and creates the API client.
fn init(config_path: Option<PathBuf>) -> Result<Client> {
    let config_path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;
    setup_logger(config.log_file.as_deref(), &config.log_filter)?;

    let endpoint = match &config.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => Url::parse(DEFAULT_ENDPOINT)?,
    };
    let credentials = EntityCredentials {
        entity: config.email.clone(),
        entity_type: EntityType::EmailAddress,
        entity_password: password(&config)?,
        container_id: config.container_id,
    };
    let options = ClientOptions {
        timeout: config.request_timeout,
        transport_attempts: config.transport_attempts,
        ..ClientOptions::default()
    };
    Ok(Client::with_options(endpoint, credentials, options)?)
}

fn password(config: &Config) -> Result<String> {
    if let Some(password) = &config.password {
        return Ok(password.clone());
    }
    let value = rpassword::prompt_password(format!("IronBox password for {}: ", config.email))?;
    if value.is_empty() {
        bail!("no password provided");
    }
    Ok(value)
}

fn encrypt(input: &Path, output: &Path, key: &str, iv: &str, key_strength: i64) -> Result<()> {
    let spec = CipherSpec::builder()
        .symmetric_key(BASE64_STANDARD.decode(key).context("invalid base64 in key")?)
        .initialization_vector(BASE64_STANDARD.decode(iv).context("invalid base64 in IV")?)
        .key_strength(key_strength)?
        .build()?;
    let written = PaddingFileEncrypter::new(&spec)?.encrypt_file(input, output)?;
    info!(written, cipher = %spec.cipher(), "encrypted {input:?} into {output:?}");
    Ok(())
}

/// Log output: appends to `log_file` if set, stdout otherwise.
#[inline]
pub fn log_writer(log_file: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    Ok(match log_file {
        Some(path) => Box::new(
            fs_err::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => Box::new(io::stdout()),
    })
}

#[inline]
pub fn setup_logger(log_file: Option<&Path>, log_filter: &str) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(log_file.is_none())
        .with_writer(Mutex::new(log_writer(log_file)?));
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_new(log_filter)?)
        .try_init()?;
    Ok(())
}
