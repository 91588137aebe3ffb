//! CSV rendering for the `/download` endpoint

use crate::types::responses::DailyStatRow;

/// Columns a CSV export can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Date,
    PageViews,
    Clicks,
    WebViews,
    MobileViews,
    WebClicks,
    MobileClicks,
    AverageDuration,
}

/// One CSV column: header label plus the field it renders
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub field: StatField,
}

/// Columns for the unsplit configuration
pub fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            label: "Date",
            field: StatField::Date,
        },
        FieldSpec {
            label: "Page Views",
            field: StatField::PageViews,
        },
        FieldSpec {
            label: "Clicks",
            field: StatField::Clicks,
        },
        FieldSpec {
            label: "Average Duration (s)",
            field: StatField::AverageDuration,
        },
    ]
}

/// Columns for the channel-split configuration
pub fn channel_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            label: "Date",
            field: StatField::Date,
        },
        FieldSpec {
            label: "Web Page Views",
            field: StatField::WebViews,
        },
        FieldSpec {
            label: "Mobile Page Views",
            field: StatField::MobileViews,
        },
        FieldSpec {
            label: "Web Clicks",
            field: StatField::WebClicks,
        },
        FieldSpec {
            label: "Mobile Clicks",
            field: StatField::MobileClicks,
        },
        FieldSpec {
            label: "Average Duration (s)",
            field: StatField::AverageDuration,
        },
    ]
}

/// Render rows as CSV in input order, one header row of labels first.
/// With `bom`, the output is prefixed with the UTF-8 byte-order mark for
/// spreadsheet locales that need it. Absent counters render as empty
/// fields.
pub fn render_csv(
    rows: &[DailyStatRow],
    fields: &[FieldSpec],
    bom: bool,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(fields.iter().map(|f| f.label))?;
    for row in rows {
        writer.write_record(fields.iter().map(|f| field_value(row, f.field)))?;
    }

    let data = writer.into_inner().map_err(|e| e.into_error())?;

    let mut out = Vec::with_capacity(data.len() + 3);
    if bom {
        out.extend_from_slice("\u{FEFF}".as_bytes());
    }
    out.extend_from_slice(&data);
    Ok(out)
}

fn field_value(row: &DailyStatRow, field: StatField) -> String {
    match field {
        StatField::Date => row.date.clone(),
        StatField::PageViews => optional(row.page_views),
        StatField::Clicks => optional(row.clicks),
        StatField::WebViews => optional(row.web_views),
        StatField::MobileViews => optional(row.mobile_views),
        StatField::WebClicks => optional(row.web_clicks),
        StatField::MobileClicks => optional(row.mobile_clicks),
        StatField::AverageDuration => row.average_duration.to_string(),
    }
}

fn optional(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
