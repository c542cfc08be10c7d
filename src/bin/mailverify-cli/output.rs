use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailverify_lib::VerificationResult;

pub fn write_reports(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows, cli),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_rejected(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| !row.is_valid)
}

fn write_human(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    let report = human_report(rows);
    if let Some(path) = &cli.out {
        write_all_atomically(path, report.as_bytes())?;
    } else {
        print!("{report}");
    }
    Ok(())
}

fn human_report(rows: &[VerificationResult]) -> String {
    let mut report = String::new();
    for line in rows.iter().flat_map(human_lines) {
        report.push_str(&line);
        report.push('\n');
    }
    report
}

fn human_lines(row: &VerificationResult) -> Vec<String> {
    if !row.syntax_valid {
        return vec![format!("[INVALID] {} :: {}", row.email, row.error)];
    }

    let mut lines = Vec::new();
    if row.is_valid {
        lines.push(format!("[OK]    {}", row.email));
    } else {
        lines.push(format!("[FAIL]  {} :: {}", row.email, row.error));
    }
    lines.push(format!("        mx: {}", if row.has_mx { "yes" } else { "no" }));
    lines.push(format!("        spf: {}", record_or_none(&row.spf_record)));
    lines.push(format!("        dmarc: {}", record_or_none(&row.dmarc_record)));
    lines
}

fn record_or_none(record: &str) -> &str {
    if record.is_empty() { "none" } else { record }
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.serialize(row)?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
