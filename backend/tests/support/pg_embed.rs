//! Bootstraps the embedded PostgreSQL cluster shared by repository tests.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` by default, which
//! sandboxed runners cannot write to. When `PG_RUNTIME_DIR` or `PG_DATA_DIR`
//! is unset, both are pointed at unique directories under the cargo target
//! directory for the duration of the bootstrap. `PG_PASSWORD` is pinned so a
//! reused data directory keeps accepting the password it was created with.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;
use uuid::Uuid;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;
const STABLE_PASSWORD: &str = "blog_embedded_test";

fn target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn unique_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let base = target_dir().join(format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

/// Whether a bootstrap failure looks like a flaky download.
fn is_transient(error: &str) -> bool {
    const PATTERNS: [&str; 7] = [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
    ];
    let lower = error.to_lowercase();
    PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Environment overrides applied while the cluster starts.
fn bootstrap_env() -> Result<Vec<(&'static str, Option<String>)>, String> {
    let mut vars = Vec::new();
    if std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none() {
        let (runtime_dir, data_dir) = unique_dirs().map_err(|err| err.to_string())?;
        vars.push(("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())));
        vars.push(("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())));
    }
    if std::env::var_os("PG_PASSWORD").is_none() {
        vars.push(("PG_PASSWORD", Some(STABLE_PASSWORD.to_owned())));
    }
    Ok(vars)
}

/// The process-wide cluster, started on first use.
///
/// Retries up to [`MAX_RETRIES`] times with exponential backoff when the
/// failure looks transient, since binary downloads fail intermittently when
/// suites run in parallel.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _bootstrap_guard = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    let vars = bootstrap_env()?;
    let _env_guard = (!vars.is_empty()).then(|| env_lock::lock_env(vars));

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt == MAX_RETRIES || !is_transient(&last_error) {
                    break;
                }
                std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * (1 << attempt)));
            }
        }
    }
    Err(last_error)
}
