//! CSV import of fans and participation logs.
//!
//! Parsing is all-or-nothing at the caller: every row is validated and
//! row errors are collected, so a batch is either inserted whole or rejected
//! with the full error list.

pub mod labels;

use crate::domain::{effective_venue, Area, Decimal, EventRecord, EventType, Fan, FanId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use labels::*;

/// Rows echoed back in a dry run.
pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV needs a header row and at least one data row")]
    Empty,
    #[error("csv parse error: {0}")]
    Csv(String),
}

/// A rejected row. `row` is the 1-based line number counting the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of validating a whole payload.
#[derive(Debug, Clone)]
pub struct ParsedImport<T> {
    pub total: usize,
    pub valid: Vec<T>,
    pub errors: Vec<ImportRowError>,
}

impl<T> ParsedImport<T> {
    pub fn preview(&self) -> &[T] {
        &self.valid[..self.valid.len().min(PREVIEW_LIMIT)]
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanDraft {
    pub display_name: String,
    pub residence_area: Area,
    pub memo: Option<String>,
}

impl FanDraft {
    pub fn into_fan(self) -> Fan {
        Fan::new(self.display_name, self.residence_area).with_memo(self.memo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDraft {
    pub date: NaiveDate,
    pub fan_id: FanId,
    pub fan_name: String,
    pub event_type: EventType,
    pub venue_area: Area,
    pub attend_count: i64,
    pub merch_amount: Decimal,
    pub donation_amount: Decimal,
    pub note: Option<String>,
}

impl LogDraft {
    pub fn into_record(self) -> EventRecord {
        let mut record = EventRecord::new(
            self.date,
            self.fan_id,
            self.event_type,
            self.venue_area,
            self.attend_count,
            self.merch_amount,
            self.donation_amount,
        );
        record.note = self.note;
        record
    }
}

struct CsvRow {
    line: usize,
    fields: HashMap<&'static str, String>,
}

impl CsvRow {
    fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    fn optional(&self, field: &str) -> Option<String> {
        Some(self.get(field).to_string()).filter(|s| !s.is_empty())
    }
}

fn read_rows(
    text: &str,
    field_for: fn(&str) -> Option<&'static str>,
) -> Result<Vec<CsvRow>, ImportError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<&'static str>> = reader
        .headers()
        .map_err(|e| ImportError::Csv(e.to_string()))?
        .iter()
        .map(field_for)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut fields = HashMap::new();
        for (column, value) in columns.iter().zip(record.iter()) {
            if let Some(field) = column {
                fields.insert(*field, value.to_string());
            }
        }
        rows.push(CsvRow {
            line: rows.len() + 2,
            fields,
        });
    }

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

fn validate<T>(
    rows: Vec<CsvRow>,
    mut check: impl FnMut(&CsvRow) -> Result<T, String>,
) -> ParsedImport<T> {
    let total = rows.len();
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for row in &rows {
        match check(row) {
            Ok(item) => valid.push(item),
            Err(message) => errors.push(ImportRowError {
                row: row.line,
                message,
            }),
        }
    }
    ParsedImport {
        total,
        valid,
        errors,
    }
}

/// Validate a fan sheet.
///
/// # Errors
/// Returns an error when the payload is malformed or has no data rows.
pub fn parse_fans_csv(text: &str) -> Result<ParsedImport<FanDraft>, ImportError> {
    let rows = read_rows(text, fan_field)?;
    Ok(validate(rows, |row| {
        let display_name = row.get(FIELD_DISPLAY_NAME);
        if display_name.is_empty() {
            return Err("displayName is required".to_string());
        }
        let area_label = row.get(FIELD_RESIDENCE_AREA);
        let residence_area = area_from_label(area_label)
            .filter(Area::is_physical)
            .ok_or_else(|| format!("invalid residenceArea: \"{area_label}\""))?;
        Ok(FanDraft {
            display_name: display_name.to_string(),
            residence_area,
            memo: row.optional(FIELD_MEMO),
        })
    }))
}

/// Validate a log sheet. Fans are matched by exact display name.
///
/// # Errors
/// Returns an error when the payload is malformed or has no data rows.
pub fn parse_logs_csv(text: &str, fans: &[Fan]) -> Result<ParsedImport<LogDraft>, ImportError> {
    let rows = read_rows(text, log_field)?;
    let fans_by_name: HashMap<&str, &Fan> =
        fans.iter().map(|f| (f.display_name.as_str(), f)).collect();

    Ok(validate(rows, |row| {
        let date_label = row.get(FIELD_DATE);
        if date_label.is_empty() {
            return Err("date is required".to_string());
        }
        let date = parse_date(date_label)
            .ok_or_else(|| format!("invalid date: \"{date_label}\" (expected YYYY-MM-DD)"))?;

        let fan_name = row.get(FIELD_FAN_NAME);
        if fan_name.is_empty() {
            return Err("fanName is required".to_string());
        }
        let fan = fans_by_name
            .get(fan_name)
            .ok_or_else(|| format!("unknown fan: \"{fan_name}\""))?;

        let type_label = row.get(FIELD_EVENT_TYPE);
        let event_type = event_type_from_label(type_label)
            .ok_or_else(|| format!("invalid eventType: \"{type_label}\""))?;

        let venue_area = if event_type.is_online() {
            Area::Online
        } else {
            let venue_label = row.get(FIELD_VENUE_AREA);
            area_from_label(venue_label)
                .ok_or_else(|| format!("invalid venueArea: \"{venue_label}\""))?
        };

        let attend_count = match row.get(FIELD_ATTEND_COUNT) {
            "" => 1,
            s => s
                .parse::<i64>()
                .map_err(|_| format!("invalid attendCount: \"{s}\""))?,
        };
        if attend_count < 1 {
            return Err("attendCount must be >= 1".to_string());
        }

        let merch_amount = parse_amount(row.get(FIELD_MERCH_AMOUNT), FIELD_MERCH_AMOUNT)?;
        let donation_amount = parse_amount(row.get(FIELD_DONATION_AMOUNT), FIELD_DONATION_AMOUNT)?;

        Ok(LogDraft {
            date,
            fan_id: fan.id.clone(),
            fan_name: fan.display_name.clone(),
            event_type,
            venue_area: effective_venue(event_type, venue_area),
            attend_count,
            merch_amount,
            donation_amount,
            note: row.optional(FIELD_NOTE),
        })
    }))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

/// Amounts default to 0 and may carry `,` or full-width `，` separators.
fn parse_amount(s: &str, field: &str) -> Result<Decimal, String> {
    if s.is_empty() {
        return Ok(Decimal::zero());
    }
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '，')).collect();
    let amount = Decimal::from_str_canonical(&cleaned)
        .map_err(|_| format!("invalid {field}: \"{s}\""))?;
    if amount.is_negative() {
        return Err(format!("{field} must be >= 0"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fans() -> Vec<Fan> {
        vec![
            Fan::new("Aki", Area::Kobe).with_id(FanId::new("f-aki")),
            Fan::new("Ren", Area::Tokyo).with_id(FanId::new("f-ren")),
        ]
    }

    #[test]
    fn test_fans_with_japanese_headers_and_bom() {
        let csv = "\u{feff}表示名,居住エリア,メモ\nAki,神戸,\n Ren , TOKYO ,古参\n";
        let parsed = parse_fans_csv(csv).unwrap();
        assert_eq!(parsed.total, 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.valid[1].display_name, "Ren");
        assert_eq!(parsed.valid[1].residence_area, Area::Tokyo);
        assert_eq!(parsed.valid[1].memo.as_deref(), Some("古参"));
        assert!(parsed.valid[0].memo.is_none());
    }

    #[test]
    fn test_fan_row_errors_use_line_numbers() {
        let csv = "displayName,residenceArea\nAki,KOBE\n,OSAKA\nRen,ONLINE\n";
        let parsed = parse_fans_csv(csv).unwrap();
        assert_eq!(parsed.valid.len(), 1);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3, 4]);
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            parse_fans_csv("displayName,residenceArea\n"),
            Err(ImportError::Empty)
        ));
        assert!(matches!(parse_fans_csv(""), Err(ImportError::Empty)));
    }

    #[test]
    fn test_logs_defaults_and_online_venue() {
        let csv = "日付,ファン名,種別,会場,物販(円),スパチャ(円)\n\
                   2024-05-01,Aki,有料ライブ,大阪,\"3,000\",\n\
                   2024/05/02,Ren,youtube,TOKYO,,1，200\n";
        let parsed = parse_logs_csv(csv, &fans()).unwrap();
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

        let live = &parsed.valid[0];
        assert_eq!(live.fan_id, FanId::new("f-aki"));
        assert_eq!(live.venue_area, Area::Osaka);
        assert_eq!(live.attend_count, 1);
        assert_eq!(live.merch_amount, Decimal::from_i64(3000));
        assert_eq!(live.donation_amount, Decimal::zero());

        let stream = &parsed.valid[1];
        assert_eq!(stream.event_type, EventType::YouTube);
        assert_eq!(stream.venue_area, Area::Online);
        assert_eq!(stream.donation_amount, Decimal::from_i64(1200));
    }

    #[test]
    fn test_log_row_errors() {
        let csv = "date,fanName,eventType,venueArea,attendCount,merchAmount\n\
                   ,Aki,PaidLive,KOBE,1,0\n\
                   2024-05-01,Nobody,PaidLive,KOBE,1,0\n\
                   2024-05-01,Aki,Handshake,KOBE,1,0\n\
                   2024-05-01,Aki,PaidLive,MARS,1,0\n\
                   2024-05-01,Aki,PaidLive,KOBE,0,0\n\
                   2024-05-01,Aki,PaidLive,KOBE,1,-5\n\
                   2024-05-01,Aki,PaidLive,KOBE,2,500\n";
        let parsed = parse_logs_csv(csv, &fans()).unwrap();
        assert_eq!(parsed.total, 7);
        assert_eq!(parsed.valid.len(), 1);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3, 4, 5, 6, 7]);
        assert!(parsed.errors[1].message.contains("Nobody"));
    }

    #[test]
    fn test_preview_is_capped() {
        let mut csv = String::from("displayName,residenceArea\n");
        for i in 0..15 {
            csv.push_str(&format!("fan{i},NARA\n"));
        }
        let parsed = parse_fans_csv(&csv).unwrap();
        assert_eq!(parsed.valid.len(), 15);
        assert_eq!(parsed.preview().len(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_draft_into_record_forces_online() {
        let draft = LogDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            fan_id: FanId::new("f"),
            fan_name: "Aki".to_string(),
            event_type: EventType::PaidStream,
            venue_area: Area::Kobe,
            attend_count: 1,
            merch_amount: Decimal::zero(),
            donation_amount: Decimal::zero(),
            note: Some("first".to_string()),
        };
        let record = draft.into_record();
        assert_eq!(record.venue_area, Area::Online);
        assert_eq!(record.note.as_deref(), Some("first"));
    }
}
