use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::matcher::ReconciliationResult;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("report rendering failed: {0}")]
    Render(String),
}

/// Suggested download name for a report generated on `date`.
pub fn report_filename(date: NaiveDate) -> String {
    format!("bank-comparison-report-{}.csv", date.format("%Y-%m-%d"))
}

/// Render a comparison run as CSV text.
///
/// Fixed section order: Summary, then Mismatched Transactions, Missing from
/// Bank and Missing from Records — each of the latter three only when it has
/// rows. Amounts always carry two decimal places; quoting and escaping are
/// the writer's standard CSV behavior.
pub fn generate(result: &ReconciliationResult) -> Result<String, ReportError> {
    let mut sections = Vec::new();

    sections.push(write_section(vec![
        vec!["Summary".to_string()],
        vec!["Matched".to_string(), result.matched.len().to_string()],
        vec![
            "Missing from Bank".to_string(),
            result.user_only.len().to_string(),
        ],
        vec![
            "Missing from Records".to_string(),
            result.bank_only.len().to_string(),
        ],
        vec!["Mismatched".to_string(), result.mismatched.len().to_string()],
    ])?);

    if !result.mismatched.is_empty() {
        let mut rows = vec![
            vec!["Mismatched Transactions".to_string()],
            [
                "Reason",
                "Date",
                "Your Description",
                "Your Category",
                "Your Amount",
                "Your Type",
                "Bank Description",
                "Bank Amount",
                "Bank Type",
            ]
            .map(String::from)
            .to_vec(),
        ];
        for m in &result.mismatched {
            rows.push(vec![
                m.reason.to_string(),
                m.user.date.to_string(),
                m.user.description.clone(),
                m.user.category.clone(),
                fmt_amount(m.user.amount),
                m.user.kind.to_string(),
                m.bank.description.clone(),
                fmt_amount(m.bank.amount),
                m.bank.flow.to_string(),
            ]);
        }
        sections.push(write_section(rows)?);
    }

    if !result.user_only.is_empty() {
        let mut rows = vec![
            vec!["Missing from Bank".to_string()],
            ["Date", "Description", "Category", "Amount", "Type"]
                .map(String::from)
                .to_vec(),
        ];
        for tx in &result.user_only {
            rows.push(vec![
                tx.date.to_string(),
                tx.description.clone(),
                tx.category.clone(),
                fmt_amount(tx.amount),
                tx.kind.to_string(),
            ]);
        }
        sections.push(write_section(rows)?);
    }

    if !result.bank_only.is_empty() {
        let mut rows = vec![
            vec!["Missing from Records".to_string()],
            ["Date", "Description", "Amount", "Type"]
                .map(String::from)
                .to_vec(),
        ];
        for rec in &result.bank_only {
            rows.push(vec![
                rec.date.to_string(),
                rec.description.clone(),
                fmt_amount(rec.amount),
                rec.flow.to_string(),
            ]);
        }
        sections.push(write_section(rows)?);
    }

    Ok(sections.join("\n"))
}

fn fmt_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Render one block of rows through the CSV writer so every field gets
/// standard quote-escaping. Sections have ragged widths, hence `flexible`.
fn write_section(rows: Vec<Vec<String>>) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Render(e.to_string()))
}
