use crate::database::{Client, Lead};
use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const LEAD_HEADERS: [(&str, f64); 16] = [
    ("Lead ID", 12.0),
    ("Date", 12.0),
    ("Company Name", 25.0),
    ("Contact Person", 22.0),
    ("Contact Number", 16.0),
    ("Email", 28.0),
    ("City", 14.0),
    ("State", 16.0),
    ("Country", 14.0),
    ("Inquiry Source", 18.0),
    ("Assigned To", 18.0),
    ("Status", 14.0),
    ("Product Interested", 22.0),
    ("Initial Remarks", 32.0),
    ("Value", 12.0),
    ("Inquiry Date", 12.0),
];

const CLIENT_HEADERS: [(&str, f64); 5] = [
    ("Company", 25.0),
    ("Pincode", 12.0),
    ("State", 16.0),
    ("Main Area", 18.0),
    ("Sub Area", 30.0),
];

fn write_header(sheet: &mut Worksheet, headers: &[(&str, f64)]) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, (name, width)) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &bold)?;
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn write_opt(sheet: &mut Worksheet, row: u32, col: u16, value: &Option<String>) -> Result<()> {
    if let Some(v) = value {
        sheet.write_string(row, col, v)?;
    }
    Ok(())
}

/// Build the downloadable leads workbook: current data under the same
/// headers the importer accepts, so the file doubles as a template.
pub fn lead_template(leads: &[Lead]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Leads")?;
    write_header(sheet, &LEAD_HEADERS)?;

    for (i, lead) in leads.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &lead.lead_id)?;
        sheet.write_string(row, 1, lead.created_at.format("%Y-%m-%d").to_string())?;
        sheet.write_string(row, 2, &lead.company)?;
        sheet.write_string(row, 3, &lead.contact)?;
        write_opt(sheet, row, 4, &lead.phone)?;
        write_opt(sheet, row, 5, &lead.email)?;
        write_opt(sheet, row, 6, &lead.city)?;
        write_opt(sheet, row, 7, &lead.state)?;
        write_opt(sheet, row, 8, &lead.country)?;
        write_opt(sheet, row, 9, &lead.source)?;
        write_opt(sheet, row, 10, &lead.assigned_to_name)?;
        sheet.write_string(row, 11, lead.status.as_str())?;
        write_opt(sheet, row, 12, &lead.product_interested)?;
        write_opt(sheet, row, 13, &lead.remarks)?;
        sheet.write_number(row, 14, lead.value as f64)?;
        if let Some(date) = lead.inquiry_date {
            sheet.write_string(row, 15, date.format("%Y-%m-%d").to_string())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build the clients workbook: existing clients plus three blank rows to
/// fill in, sub-areas joined with semicolons the way the importer splits
/// them.
pub fn client_template(clients: &[Client]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Clients")?;
    write_header(sheet, &CLIENT_HEADERS)?;

    for (i, client) in clients.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &client.company)?;
        write_opt(sheet, row, 1, &client.pincode)?;
        write_opt(sheet, row, 2, &client.state)?;
        write_opt(sheet, row, 3, &client.main_area)?;
        sheet.write_string(row, 4, client.sub_areas.join(";"))?;
    }

    // Blank rows so an empty export still reads as a fillable template.
    for i in 0..3 {
        let row = (clients.len() + 1 + i) as u32;
        sheet.write_string(row, 0, "")?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::LeadStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_lead() -> Lead {
        Lead {
            id: Uuid::new_v4(),
            lead_id: "LD123456001".to_string(),
            company: "Acme Industries".to_string(),
            contact: "Ravi Kumar".to_string(),
            phone: Some("9876500001".to_string()),
            email: None,
            city: Some("Mumbai".to_string()),
            state: None,
            country: None,
            source: Some("IndiaMART".to_string()),
            product_interested: None,
            assigned_to: None,
            assigned_to_name: None,
            status: LeadStatus::New,
            value: 50000,
            remarks: None,
            inquiry_date: None,
            next_follow_up_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn lead_template_is_a_zip_workbook() {
        let buf = lead_template(&[sample_lead()]).unwrap();
        assert_eq!(&buf[..2], b"PK");
    }

    #[test]
    fn client_template_builds_when_empty() {
        let buf = client_template(&[]).unwrap();
        assert_eq!(&buf[..2], b"PK");
    }
}
