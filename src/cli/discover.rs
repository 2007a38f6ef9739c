// src/cli/discover.rs — `recipe-sweep discover`

use std::path::Path;

use crate::core::discovery;
use crate::core::worklist::WorkList;
use crate::dss::DssApi;
use crate::infra::config::Config;

/// Discover recipes under the configured folder and save the work list.
pub async fn run_discover(
    api: &dyn DssApi,
    config: &Config,
    work_list: &Path,
    force: bool,
    quiet: bool,
) -> anyhow::Result<WorkList> {
    if work_list.exists() && !force {
        anyhow::bail!(
            "{} already exists. Run `recipe-sweep run` to use it, or `discover --force` to replace it.",
            work_list.display()
        );
    }

    if !quiet {
        eprintln!("Scanning folder '{}' on {}", config.folder, config.instance);
    }

    let work = discovery::discover(api, &config.instance, &config.folder, |key, items| {
        if !quiet {
            eprintln!("  {:<32} {} recipe(s)", key, items.len());
        }
    })
    .await?;

    work.save(work_list)?;
    println!(
        "Saved {} recipe(s) from {} project(s) to {}",
        work.len(),
        work.project_count(),
        work_list.display()
    );
    Ok(work)
}
