//! `hostforge status` command

use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::StatusArgs;
use hostforge::load_config;
use hostforge::ops::status;

pub fn execute(config_path: Option<&Path>, args: StatusArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let report = status::gather(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", status::format_report(&report));
    }

    if !report.all_required_installed() {
        bail!(
            "{} required component(s) missing",
            report.required_missing_count()
        );
    }

    Ok(())
}
