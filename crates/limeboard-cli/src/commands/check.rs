//! Check command: verify credentials without exporting responses.

use anyhow::{Result, bail};
use limeboard::{Config, Limeboard};
use tracing::error;

pub fn run(config: &Config) -> Result<()> {
    let checked = config.resolve().and_then(|resolved| {
        let endpoint = resolved.endpoint.clone();
        Limeboard::connect(resolved)?.check_credentials()?;
        Ok(endpoint)
    });

    match checked {
        Ok(endpoint) => {
            println!("Credentials OK: session key acquired and released at {}", endpoint);
            Ok(())
        }
        Err(e) => {
            error!("Credential check failed ({}): {}", e.kind(), e);
            bail!("{}", e.user_message())
        }
    }
}
