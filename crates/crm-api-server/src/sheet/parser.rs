use crate::database::{ClientDraft, LeadStatus};
use crate::utils::dates::{from_excel_serial, parse_flexible_date};
use anyhow::{anyhow, Result};
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

/// One parsed spreadsheet cell, already collapsed to the three shapes the
/// importers care about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            Cell::Number(n) => {
                // Spreadsheets love turning pincodes into floats.
                if n.fract() == 0.0 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Empty => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => Some(*n as i64),
            Cell::Text(s) => {
                let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
                cleaned.parse().ok()
            }
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => from_excel_serial(*n),
            Cell::Text(s) => parse_flexible_date(s),
            Cell::Empty => None,
        }
    }
}

/// One data row keyed by normalized header name.
pub type Row = HashMap<String, Cell>;

/// A lead row as it comes off an import sheet. The assignee is still a
/// display name here; resolution to a team member happens against the
/// database.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRow {
    pub company: String,
    pub contact: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub product_interested: Option<String>,
    pub assigned_to_name: Option<String>,
    pub status: LeadStatus,
    pub value: i64,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
}

/// Lowercase and strip separators so "Company Name", "company_name" and
/// "companyName" all land on the same key.
fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}

/// Parse an uploaded sheet into header-keyed rows. The first non-empty row
/// is the header. Dispatches on file extension: xlsx via calamine, anything
/// else treated as delimited text with the delimiter sniffed from the
/// header line.
pub fn parse_table(filename: &str, bytes: &[u8]) -> Result<Vec<Row>> {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    debug!("Parsing upload {} ({} bytes)", filename, bytes.len());

    match extension.as_str() {
        "xlsx" | "xlsm" => parse_xlsx(bytes),
        _ => parse_delimited(bytes),
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<Row>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| anyhow!("invalid workbook: {}", e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))?
        .map_err(|e| anyhow!("unreadable worksheet: {}", e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("sheet is empty"))?
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();

    let mut out = Vec::new();
    for row in rows {
        let mut map = Row::new();
        for (i, cell) in row.iter().enumerate() {
            let Some(header) = headers.get(i) else { continue };
            if header.is_empty() {
                continue;
            }
            let value = match cell {
                Data::String(s) => Cell::Text(s.clone()),
                Data::Float(f) => Cell::Number(*f),
                Data::Int(i) => Cell::Number(*i as f64),
                Data::Bool(b) => Cell::Text(b.to_string()),
                Data::DateTime(d) => from_excel_serial(d.as_f64())
                    .map(Cell::Date)
                    .unwrap_or(Cell::Empty),
                Data::DateTimeIso(s) => parse_flexible_date(s)
                    .map(Cell::Date)
                    .unwrap_or_else(|| Cell::Text(s.clone())),
                Data::DurationIso(s) => Cell::Text(s.clone()),
                Data::Error(_) | Data::Empty => Cell::Empty,
            };
            map.insert(header.clone(), value);
        }
        if map.values().any(|c| *c != Cell::Empty) {
            out.push(map);
        }
    }
    Ok(out)
}

fn parse_delimited(bytes: &[u8]) -> Result<Vec<Row>> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines.next().ok_or_else(|| anyhow!("file is empty"))?;
    let delimiter = if header_line.matches('\t').count() >= header_line.matches(',').count() {
        '\t'
    } else {
        ','
    };
    let headers: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|h| normalize_header(&h))
        .collect();

    let mut out = Vec::new();
    for line in lines {
        let fields = split_line(line, delimiter);
        let mut map = Row::new();
        for (i, field) in fields.into_iter().enumerate() {
            let Some(header) = headers.get(i) else { continue };
            if header.is_empty() {
                continue;
            }
            let trimmed = field.trim();
            let cell = if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            };
            map.insert(header.clone(), cell);
        }
        if map.values().any(|c| *c != Cell::Empty) {
            out.push(map);
        }
    }
    Ok(out)
}

/// Split one delimited line, honoring double-quoted fields.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn text_field(row: &Row, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| row.get(*k)?.as_text())
}

/// Map header-keyed rows to lead rows, honoring the header synonyms the
/// templates in the wild actually use. Rows without both a company and a
/// contact are dropped; unknown statuses fall back to New.
pub fn parse_lead_rows(rows: &[Row]) -> Vec<LeadRow> {
    rows.iter()
        .filter_map(|row| {
            let company = text_field(row, &["companyname", "company", "organization"])?;
            let contact = text_field(row, &["contactperson", "contact"])?;
            let status = text_field(row, &["status"])
                .and_then(|s| s.parse::<LeadStatus>().ok())
                .unwrap_or(LeadStatus::New);
            let value = row
                .get("value")
                .and_then(|c| c.as_i64())
                .unwrap_or(0)
                .max(0);

            Some(LeadRow {
                company,
                contact,
                phone: text_field(row, &["contactnumber", "phone", "mobile"]),
                email: text_field(row, &["email", "emailid"]),
                city: text_field(row, &["city"]),
                state: text_field(row, &["state"]),
                country: text_field(row, &["country"]),
                source: text_field(row, &["inquirysource", "source"]),
                product_interested: text_field(row, &["productinterested"]),
                assigned_to_name: text_field(row, &["assignedto", "assignsalesperson"]),
                status,
                value,
                remarks: text_field(row, &["initialremarks", "remarks"]),
                inquiry_date: row.get("inquirydate").and_then(|c| c.as_date()),
            })
        })
        .collect()
}

/// Map header-keyed rows to client drafts. Sub-areas arrive as one
/// semicolon-separated cell. Rows without a company are dropped.
pub fn parse_client_rows(rows: &[Row]) -> Vec<ClientDraft> {
    rows.iter()
        .filter_map(|row| {
            let company = text_field(row, &["company", "companyname"])?;
            let sub_areas = text_field(row, &["subarea", "subareas", "multipleareas"])
                .map(|raw| {
                    raw.split(';')
                        .map(|a| a.trim().to_string())
                        .filter(|a| !a.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            Some(ClientDraft {
                company,
                pincode: text_field(row, &["pincode"]),
                state: text_field(row, &["state"]),
                main_area: text_field(row, &["mainarea"]),
                sub_areas,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Cell::Text(v.to_string())))
            .collect()
    }

    #[test]
    fn headers_normalize_to_one_spelling() {
        assert_eq!(normalize_header("Company Name"), "companyname");
        assert_eq!(normalize_header("company_name"), "companyname");
        assert_eq!(normalize_header("  Sub-Area "), "subarea");
    }

    #[test]
    fn csv_parses_with_quoted_commas() {
        let data = b"Company,Contact Person\n\"Acme, Inc\",Ravi\n";
        let rows = parse_table("leads.csv", data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("company").unwrap().as_text().unwrap(),
            "Acme, Inc"
        );
    }

    #[test]
    fn tsv_delimiter_is_sniffed() {
        let data = b"Company\tPincode\nOrbit Tools\t400001\n";
        let rows = parse_table("clients.txt", data).unwrap();
        assert_eq!(rows[0].get("pincode").unwrap().as_text().unwrap(), "400001");
    }

    #[test]
    fn lead_rows_need_company_and_contact() {
        let rows = vec![
            text_row(&[("companyname", "Acme"), ("contactperson", "Ravi")]),
            text_row(&[("companyname", "NoContact Ltd")]),
            text_row(&[("contactperson", "Orphan")]),
        ];
        let leads = parse_lead_rows(&rows);
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company, "Acme");
    }

    #[test]
    fn lead_row_synonyms_and_defaults() {
        let row = text_row(&[
            ("organization", "Vertex Pumps"),
            ("contact", "Meera"),
            ("mobile", "9876500001"),
            ("inquirysource", "IndiaMART"),
            ("status", "definitely-not-a-status"),
            ("value", "1,50,000"),
        ]);
        let leads = parse_lead_rows(&[row]);
        assert_eq!(leads[0].phone.as_deref(), Some("9876500001"));
        assert_eq!(leads[0].source.as_deref(), Some("IndiaMART"));
        assert_eq!(leads[0].status, LeadStatus::New);
        assert_eq!(leads[0].value, 150000);
    }

    #[test]
    fn lead_status_column_is_case_insensitive() {
        let row = text_row(&[
            ("company", "Acme"),
            ("contact", "Ravi"),
            ("status", "detail share"),
        ]);
        assert_eq!(parse_lead_rows(&[row])[0].status, LeadStatus::DetailShare);
    }

    #[test]
    fn client_sub_areas_split_on_semicolons() {
        let row = text_row(&[
            ("company", "Acme"),
            ("pincode", "400001"),
            ("subarea", "Andheri; Bandra ;;Juhu"),
        ]);
        let clients = parse_client_rows(&[row]);
        assert_eq!(
            clients[0].sub_areas,
            vec!["Andheri".to_string(), "Bandra".to_string(), "Juhu".to_string()]
        );
    }

    #[test]
    fn numeric_pincode_cell_renders_without_decimal() {
        assert_eq!(Cell::Number(400001.0).as_text().unwrap(), "400001");
    }

    #[test]
    fn date_cells_from_serial_and_text() {
        assert_eq!(
            Cell::Number(45658.0).as_date(),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(
            Cell::Text("15/03/2025".to_string()).as_date(),
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
    }
}
