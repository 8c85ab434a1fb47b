//! Configuration module for environment variable parsing.
//!
//! Reads the workflow run metadata and the action inputs that the runner
//! exposes as environment variables. Nothing is validated here: a missing
//! variable becomes an empty string.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::queue::RunInfo;

/// Connection inputs for the target queue.
#[derive(Clone, Default)]
pub struct ConnectionInfo {
    pub storage_account_name: String,
    pub storage_account_key: String,
    pub queue_name: String,
    /// Service base URL override, e.g. for the Azurite emulator.
    pub service_url: Option<String>,
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("storage_account_name", &self.storage_account_name)
            .field("storage_account_key", &"<redacted>")
            .field("queue_name", &self.queue_name)
            .field("service_url", &self.service_url)
            .finish()
    }
}

/// Everything the action reads from its environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub run: RunInfo,
    pub connection: ConnectionInfo,
    /// Step output file provided by the runner (`GITHUB_OUTPUT`).
    pub output_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_default();

        Config {
            run: RunInfo {
                workflow: var("GITHUB_WORKFLOW"),
                run_id: var("GITHUB_RUN_ID"),
                run_number: var("GITHUB_RUN_NUMBER"),
                actor: var("GITHUB_ACTOR"),
                repository: var("GITHUB_REPOSITORY"),
                event_name: var("GITHUB_EVENT_NAME"),
                event_path: var("GITHUB_EVENT_PATH"),
                sha: var("GITHUB_SHA"),
                git_ref: var("GITHUB_REF"),
                head_ref: var("GITHUB_HEAD_REF"),
                base_ref: var("GITHUB_BASE_REF"),
                job_status: var("INPUT_JOB_STATUS"),
            },
            connection: ConnectionInfo {
                storage_account_name: var("INPUT_STORAGE_ACCOUNT_NAME"),
                storage_account_key: var("INPUT_STORAGE_ACCOUNT_KEY"),
                queue_name: var("INPUT_QUEUE_NAME"),
                service_url: lookup("INPUT_QUEUE_SERVICE_URL").filter(|s| !s.trim().is_empty()),
            },
            output_file: lookup("GITHUB_OUTPUT")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}
