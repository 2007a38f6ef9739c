// src/cli/whoami.rs — `recipe-sweep whoami`

use crate::dss::DssApi;
use crate::infra::config::Config;

pub async fn show_identity(api: &dyn DssApi, config: &Config) -> anyhow::Result<()> {
    let info = api.auth_info().await?;
    println!("{} on {}", info, config.instance);
    Ok(())
}
