use anyhow::Context;
use colored::Colorize;
use modweave_sdk::{MergerConfig, Reconciler, ReconcileOptions, Reconciliation};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    let config = MergerConfig::load(&config_path)?;
    let product = config.product(&cli.product_id)?.clone();

    let options = ReconcileOptions {
        patch_name: cli.patch_name.clone(),
        out_dir: cli.out_dir(),
        extract: cli.extract,
        dry_run: cli.dry_run,
        jobs: cli.jobs.map(usize::from),
    };
    let run = Reconciler::new(product, options)
        .run()
        .with_context(|| format!("reconciling mods for {}", cli.product_id))?;

    match cli.format {
        OutputFormat::Json => println!("{}", run.report.to_json()?),
        OutputFormat::Text => print_text(&run, cli.verbose),
    }
    Ok(())
}

fn print_text(run: &Reconciliation, verbose: bool) {
    for skipped in &run.mods.skipped {
        println!(
            "{} skipped {}: {}",
            "!".yellow().bold(),
            skipped.descriptor.yellow(),
            skipped.reason
        );
    }

    if verbose {
        println!("{}", "--- Load Order ---".bold());
        for (i, name) in run.mods.names().iter().enumerate() {
            println!("{:>4}  {}", i + 1, name);
        }
        println!();
    }

    if verbose || run.report.dry_run {
        print_conflicts(run);
    }

    if run.report.dry_run {
        println!(
            "{} contested files across {} mods. Dry run, nothing written.",
            run.conflicts.len().to_string().bold(),
            run.mods.len()
        );
        return;
    }

    if !run.report.unmergeable.is_empty() {
        println!("\n{}", "--- Needs Manual Merging ---".bold());
        for entry in &run.report.unmergeable {
            println!("{}", entry.path.red());
            println!("  {}", entry.owners.join(", ").dimmed());
            if verbose {
                println!("  {}", entry.reason);
            }
        }
        println!();
    }

    if let Some(output) = &run.output {
        println!(
            "{} Wrote {} ({} files)",
            "✓".green().bold(),
            output.archive.display().to_string().bold(),
            output.staged_files
        );
        println!("  Descriptor: {}", output.descriptor.display());
        if let Some(unmerged) = &output.unmerged {
            println!("  Manual merge inputs: {}", unmerged.display().to_string().yellow());
        }
    }

    let summary = run.report.summary();
    if run.report.unmergeable.is_empty() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.yellow().bold());
    }
}

fn print_conflicts(run: &Reconciliation) {
    println!("{}", "--- Mod Conflicts ---".bold());
    for (path, owners) in run.conflicts.iter() {
        let marker = if run.baselines.contains(path) {
            "".normal()
        } else {
            " (not in base game)".dimmed()
        };
        println!("{}{}", path.cyan(), marker);
        for owner in owners {
            println!("  -- {owner}");
        }
    }
    println!();

    let by_mod = run.conflicts.by_mod();
    if !by_mod.is_empty() {
        for (name, paths) in by_mod {
            println!("{:>5}  {}", paths.len(), name.bold());
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("merger.toml");
        let cli = Cli::try_parse_from([
            "modweave",
            "-c",
            config.to_str().unwrap(),
            "eu4",
            "Patch",
        ])
        .unwrap();
        let err = run_command(cli).unwrap_err();
        assert!(err.to_string().contains("could not read file"));
    }

    #[test]
    fn unknown_product_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("merger.toml");
        std::fs::write(
            &config,
            "[eu4]\nmodpath = \"m\"\ndatapath = \"d\"\nvalid_paths = [\"common\"]\n",
        )
        .unwrap();
        let cli = Cli::try_parse_from([
            "modweave",
            "-c",
            config.to_str().unwrap(),
            "ck3",
            "Patch",
        ])
        .unwrap();
        let err = run_command(cli).unwrap_err();
        assert!(err.to_string().contains("ck3"));
    }
}
