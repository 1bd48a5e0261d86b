//! Runtime settings

use tracing::debug;

use crate::config::CliArgs;
use crate::core::error::SettingsResult;
use crate::core::types::ConnectionOptions;

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: ConnectionOptions,
    pub debug: bool,
}

impl Settings {
    /// Assemble settings from CLI arguments, loading the profile when given
    ///
    /// Profile fields come first; command-line arguments extend the service
    /// lists and override the name filters.
    pub async fn load(args: &CliArgs) -> SettingsResult<Self> {
        let mut options = match &args.profile {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let options: ConnectionOptions = serde_json::from_str(&raw)?;
                debug!("Loaded connection profile from {}", path);
                options
            }
            None => ConnectionOptions::default(),
        };

        options.services.extend(args.services.iter().copied());
        options
            .optional_services
            .extend(args.optional_services.iter().copied());
        if args.name.is_some() {
            options.name = args.name.clone();
        }
        if args.name_prefix.is_some() {
            options.name_prefix = args.name_prefix.clone();
        }

        Ok(Settings {
            options,
            debug: args.debug,
        })
    }
}
