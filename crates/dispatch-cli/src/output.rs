use dispatch_core::{ResourceRecord, RunReport};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// One row per resolved resource, in resolution order.
pub fn resource_rows(report: &RunReport) -> Vec<Vec<String>> {
    let resolved: [(&str, &Option<ResourceRecord>); 5] = [
        ("site", &report.site),
        ("area", &report.area),
        ("line", &report.line),
        ("machine", &report.machine),
        ("dispatch type", &report.dispatch_type),
    ];
    resolved
        .iter()
        .filter_map(|&(kind, rec)| {
            rec.as_ref().map(|r| {
                vec![
                    kind.to_string(),
                    r.id.to_string(),
                    r.code.clone(),
                    r.description.clone(),
                ]
            })
        })
        .collect()
}

pub fn step_rows(report: &RunReport) -> Vec<Vec<String>> {
    report
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| vec![(i + 1).to_string(), s.step.to_string(), s.detail.clone()])
        .collect()
}
