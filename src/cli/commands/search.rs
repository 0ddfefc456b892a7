//! Search command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, run_search, SearchArgs};
use crate::error::{NasError, Result};
use crate::nas::SearchResult;
use std::fs;

pub fn run_search_command(args: SearchArgs, level: LogLevel) -> Result<()> {
    log(level, LogLevel::Normal, &format!("gumbel-nas: searching from {}", args.config.display()));

    let mut spec = load_config(&args.config)?;
    apply_overrides(&mut spec, &args)?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Optimizers: {} (lr={}) / arch {} (lr={})",
            spec.optimizer.name, spec.optimizer.lr, spec.arch_optimizer.name, spec.arch_optimizer.lr
        ),
    );
    log(level, LogLevel::Verbose, &format!("  Epochs: {}  Seed: {}", spec.epochs, spec.seed));

    let result = run_search(&spec)?;

    log(level, LogLevel::Normal, &summary(&result));
    log(level, LogLevel::Normal, &result.genotype.to_json());

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| NasError::io("serializing search result", e.into()))?;
        fs::write(path, json)
            .map_err(|e| NasError::io(format!("writing search result to {}", path.display()), e))?;
        log(level, LogLevel::Normal, &format!("Result written to {}", path.display()));
    }
    Ok(())
}

/// One line per layer: `layer: op (p)`
pub fn summary(result: &SearchResult) -> String {
    let mut lines = vec![format!(
        "Search complete: epoch {}, loss {:.4} (best {:.4}){}",
        result.final_epoch,
        result.final_loss,
        result.best_loss,
        if result.stopped_early { ", stopped early" } else { "" }
    )];
    for layer in &result.genotype.layers {
        if let Some((op, p)) = layer.dominant() {
            lines.push(format!("  {}: {op} ({p:.3})", layer.layer));
        }
    }
    lines.join("\n")
}
