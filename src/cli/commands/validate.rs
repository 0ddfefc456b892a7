//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, SearchSpec, ValidateArgs};
use crate::error::Result;

/// Format data configuration as a string
pub fn format_data_info(spec: &SearchSpec) -> String {
    format!(
        "  Samples: {}\n  Features: {}\n  Classes: {}\n  Batch size: {}",
        spec.data.samples, spec.data.features, spec.data.classes, spec.data.batch_size
    )
}

/// Format supernet layout as a string
pub fn format_model_info(spec: &SearchSpec) -> String {
    let names: Vec<&str> = spec.model.candidates.iter().map(|c| c.name.as_str()).collect();
    format!(
        "  Hidden units: {}\n  Mixture layers: {}\n  Candidates: {}\n  Cost multiplier: {}\n  Sample mode: {:?}",
        spec.model.hidden,
        spec.model.mixtures,
        names.join(", "),
        spec.mixture.cost_multiplier,
        spec.mixture.sample_mode
    )
}

/// Format both optimizers as a string
pub fn format_optimizer_info(spec: &SearchSpec) -> String {
    let mut lines = vec![
        format!("  Optimizer: {} (lr={})", spec.optimizer.name, spec.optimizer.lr),
        format!("  Arch optimizer: {} (lr={})", spec.arch_optimizer.name, spec.arch_optimizer.lr),
    ];
    if let Some(momentum) = spec.optimizer.param("momentum") {
        lines.push(format!("  Momentum: {momentum}"));
    }
    if let Some(wd) = spec.arch_optimizer.param("weight_decay") {
        lines.push(format!("  Arch weight decay: {wd}"));
    }
    lines.join("\n")
}

/// Format the temperature schedule as a string
pub fn format_schedule_info(spec: &SearchSpec) -> String {
    let t = &spec.temperature;
    format!(
        "  Epochs: {}\n  Temperature: {} -> {} over epochs {}..{}",
        spec.epochs, t.start_temp, t.end_temp, t.start_epoch, t.final_epoch
    )
}

/// Print detailed configuration summary
pub fn print_detailed_summary(spec: &SearchSpec) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_data_info(spec));
    println!();
    println!("{}", format_model_info(spec));
    println!();
    println!("{}", format_optimizer_info(spec));
    println!();
    println!("{}", format_schedule_info(spec));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<()> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    // load_config validates
    let spec = load_config(&args.config)?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed && level != LogLevel::Quiet {
        print_detailed_summary(&spec);
    }

    Ok(())
}
