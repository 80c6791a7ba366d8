//! Frame exports.
//!
//! The engine never formats output; this module projects the immutable
//! frame sequence into JSON (full fidelity) and CSV (one row per frame and
//! item, for spreadsheets and graphing).

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use falculator_core::Config;
use falculator_core::model::SimFrame;

pub fn write_frames_json(frames: &[SimFrame], path: &Path) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(frames)?;
    fs::write(path, json).wrap_err_with(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn write_frames_csv(
    config: &Config,
    frames: &[SimFrame],
    path: &Path,
) -> color_eyre::Result<()> {
    let csv = frames_to_csv(config, frames);
    fs::write(path, csv).wrap_err_with(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// One row per (frame, item), item names resolved from the config.
pub fn frames_to_csv(config: &Config, frames: &[SimFrame]) -> String {
    let mut out = String::new();
    out.push_str(
        "date,item_id,item_name,value,cash_in,cash_out,interest,cash_flow,enabled,tax_paid,\
         total_tax_paid\n",
    );
    for frame in frames {
        for state in &frame.items {
            let name = config
                .item_by_id(&state.id)
                .map(|i| i.name.as_str())
                .unwrap_or("");
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{}",
                frame.frame_date,
                state.id,
                csv_escape(name),
                state.value,
                state.cash_in_amount,
                state.cash_out_amount,
                state.interest_amount,
                state.cash_flow,
                state.enabled_by_sim,
                state.tax_paid,
                frame.total_tax_paid,
            );
        }
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
