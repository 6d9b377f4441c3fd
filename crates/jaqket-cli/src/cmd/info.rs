//! Configs and info subcommands - dataset metadata, no downloads

use anyhow::Result;
use clap::Args;

use super::{print_grid, print_table};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Config name (v1.0 or v2.0)
    pub name: String,
}

pub fn list_configs() -> Result<()> {
    let rows = jaqket::builtin_configs()
        .iter()
        .map(|c| {
            vec![
                c.name().to_string(),
                c.dataset_version().to_string(),
                c.num_contexts.to_string(),
                c.version.fallback_num_contexts().to_string(),
                c.description.trim().to_string(),
            ]
        })
        .collect();
    print_grid(
        &["Name", "Version", "num_contexts", "Fallback", "Description"],
        rows,
    );
    Ok(())
}

pub fn run(args: InfoArgs) -> Result<()> {
    let builtin = jaqket::builtin_config(&args.name)?;
    let info = jaqket::info(&builtin.to_config())?;

    print_table(
        ("Dataset", "Value"),
        &[
            ("Config", builtin.name().to_string()),
            ("Version", info.dataset_version.to_string()),
            ("Description", info.description.trim().to_string()),
            ("Homepage", info.homepage.to_string()),
            ("License", info.license.trim().to_string()),
            (
                "Resources",
                info.version
                    .resources()
                    .iter()
                    .map(|r| format!("{}: {}", r.key, r.url))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            ("Citation", info.citation.trim().to_string()),
        ],
    );

    let fields = info
        .schema
        .fields()
        .iter()
        .map(|f| vec![f.name().to_string(), f.data_type().to_string()])
        .collect();
    print_grid(&["Field", "Type"], fields);
    Ok(())
}
