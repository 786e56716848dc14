use std::env;
use std::str::FromStr;

use coffer_core::{AppError, AppResult, CipherId, OrganizationId, UserId};
use tracing_subscriber::EnvFilter;

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCommand {
    /// Apply migrations and exit.
    Migrate,
    /// Print the effective access of one user.
    Report,
}

#[derive(Debug, Clone)]
pub struct AccessReportConfig {
    pub command: ReportCommand,
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub ability_cache_ttl_seconds: u32,
    pub feature_flags: String,
    pub user_id: Option<UserId>,
    pub organization_id: Option<OrganizationId>,
    pub cipher_ids: Vec<CipherId>,
}

impl AccessReportConfig {
    pub fn load() -> AppResult<Self> {
        let command = match env::args().nth(1).as_deref() {
            Some("migrate") => ReportCommand::Migrate,
            None | Some("report") => ReportCommand::Report,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown command '{other}', expected 'report' or 'migrate'"
                )));
            }
        };

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let redis_url = optional_env("REDIS_URL");
        let ability_cache_ttl_seconds = parse_env_u32("ABILITY_CACHE_TTL_SECONDS", 60)?;
        let feature_flags = env::var("FEATURE_FLAGS").unwrap_or_default();

        let user_id = optional_env("REPORT_USER_ID")
            .map(|value| UserId::from_str(value.as_str()))
            .transpose()?;
        if command == ReportCommand::Report && user_id.is_none() {
            return Err(AppError::Validation(
                "REPORT_USER_ID is required to build a report".to_owned(),
            ));
        }

        let organization_id = optional_env("REPORT_ORGANIZATION_ID")
            .map(|value| OrganizationId::from_str(value.as_str()))
            .transpose()?;
        let cipher_ids = parse_id_list(
            optional_env("REPORT_CIPHER_IDS")
                .unwrap_or_default()
                .as_str(),
        )?;

        Ok(Self {
            command,
            database_url,
            database_max_connections,
            redis_url,
            ability_cache_ttl_seconds,
            feature_flags,
            user_id,
            organization_id,
            cipher_ids,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_id_list<T>(value: &str) -> AppResult<Vec<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(T::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use coffer_core::{AppError, CipherId};

    use super::parse_id_list;

    #[test]
    fn id_list_skips_blank_entries() {
        let first = CipherId::new();
        let second = CipherId::new();
        let parsed = parse_id_list::<CipherId>(format!(" {first}, ,{second} ").as_str());
        assert!(matches!(parsed, Ok(ref ids) if ids == &vec![first, second]));
    }

    #[test]
    fn id_list_rejects_malformed_entries() {
        let parsed = parse_id_list::<CipherId>("not-a-cipher");
        assert!(matches!(parsed, Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_id_list_is_empty() {
        assert!(matches!(parse_id_list::<CipherId>(""), Ok(ref ids) if ids.is_empty()));
    }
}
