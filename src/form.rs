use std::io::{self, BufRead, Write};

use crate::models::{Direction, RawRow};
use crate::session::Session;

/// Offered at the Campaign Type prompt; any other text is accepted too.
pub const CAMPAIGN_SUGGESTIONS: [&str; 6] = [
    "Events",
    "Digital/Search",
    "Influencer",
    "Commercial",
    "Social",
    "Other",
];

/// Parse a `Campaign Type|KPI Name|Benchmark|Actual|Direction` submission.
pub fn parse_entry(spec: &str) -> RawRow {
    let mut parts = spec.splitn(5, '|').map(|part| non_empty(part.to_string()));
    RawRow {
        row: 0,
        campaign_type: parts.next().flatten(),
        kpi_name: parts.next().flatten(),
        benchmark: parts.next().flatten(),
        actual: parts.next().flatten(),
        direction: parts.next().flatten(),
    }
}

/// Typed at the KPI Name prompt. The leading colon keeps every plain
/// name, `done` included, available as a KPI name.
pub const DONE_COMMAND: &str = ":done";
pub const CLEAR_COMMAND: &str = ":clear";

/// Prompt for KPIs until `:done` or end of input, adding each valid
/// submission to the session as it is entered.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: &mut R, output: &mut W) -> io::Result<()> {
    writeln!(
        output,
        "Add KPIs one at a time. Type '{DONE_COMMAND}' at the KPI Name prompt to finish, '{CLEAR_COMMAND}' to start over."
    )?;
    let campaign_label = format!("Campaign Type ({})", CAMPAIGN_SUGGESTIONS.join(", "));

    loop {
        let Some(kpi_name) = prompt(input, output, "KPI Name")? else {
            break;
        };
        match kpi_name.trim() {
            DONE_COMMAND => break,
            CLEAR_COMMAND => {
                session.clear();
                writeln!(output, "Cleared all KPIs.")?;
                continue;
            }
            "" => {
                writeln!(output, "Please enter a KPI name")?;
                continue;
            }
            _ => {}
        }

        let Some(campaign_type) = prompt(input, output, &campaign_label)? else {
            break;
        };
        let Some(benchmark) = prompt(input, output, "Benchmark")? else {
            break;
        };
        let Some(actual) = prompt(input, output, "Actual")? else {
            break;
        };
        let Some(direction) = prompt(
            input,
            output,
            "Direction [HigherIsBetter/LowerIsBetter] (default HigherIsBetter)",
        )?
        else {
            break;
        };

        let raw = RawRow {
            row: 0,
            campaign_type: non_empty(campaign_type),
            kpi_name: non_empty(kpi_name),
            benchmark: non_empty(benchmark),
            actual: non_empty(actual),
            direction: Some(
                non_empty(direction).unwrap_or_else(|| Direction::HigherIsBetter.to_string()),
            ),
        };
        match session.add_manual(raw) {
            Ok(record) => writeln!(output, "Added: {} ({})", record.kpi_name(), record.status())?,
            Err(issue) => writeln!(output, "Not added: {}", issue.error)?,
        }
    }

    writeln!(
        output,
        "{} KPI(s) entered. {}",
        session.records().len(),
        session.counts()
    )?;
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}
