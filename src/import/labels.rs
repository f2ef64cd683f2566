//! Label and header normalization for spreadsheet imports.
//!
//! Accepts the canonical codes plus the Japanese display labels used in
//! hand-maintained sheets.

use crate::domain::{Area, EventType};

pub const FIELD_DISPLAY_NAME: &str = "displayName";
pub const FIELD_RESIDENCE_AREA: &str = "residenceArea";
pub const FIELD_MEMO: &str = "memo";

pub const FIELD_DATE: &str = "date";
pub const FIELD_FAN_NAME: &str = "fanName";
pub const FIELD_EVENT_TYPE: &str = "eventType";
pub const FIELD_VENUE_AREA: &str = "venueArea";
pub const FIELD_ATTEND_COUNT: &str = "attendCount";
pub const FIELD_MERCH_AMOUNT: &str = "merchAmount";
pub const FIELD_DONATION_AMOUNT: &str = "donationAmount";
pub const FIELD_NOTE: &str = "note";

const FAN_HEADERS: &[(&str, &str)] = &[
    ("displayName", FIELD_DISPLAY_NAME),
    ("表示名", FIELD_DISPLAY_NAME),
    ("名前", FIELD_DISPLAY_NAME),
    ("ファン名", FIELD_DISPLAY_NAME),
    ("residenceArea", FIELD_RESIDENCE_AREA),
    ("居住エリア", FIELD_RESIDENCE_AREA),
    ("エリア", FIELD_RESIDENCE_AREA),
    ("memo", FIELD_MEMO),
    ("メモ", FIELD_MEMO),
    ("備考", FIELD_MEMO),
];

const LOG_HEADERS: &[(&str, &str)] = &[
    ("date", FIELD_DATE),
    ("日付", FIELD_DATE),
    ("fanName", FIELD_FAN_NAME),
    ("ファン名", FIELD_FAN_NAME),
    ("表示名", FIELD_FAN_NAME),
    ("名前", FIELD_FAN_NAME),
    ("eventType", FIELD_EVENT_TYPE),
    ("種別", FIELD_EVENT_TYPE),
    ("イベント種別", FIELD_EVENT_TYPE),
    ("venueArea", FIELD_VENUE_AREA),
    ("会場エリア", FIELD_VENUE_AREA),
    ("会場", FIELD_VENUE_AREA),
    ("エリア", FIELD_VENUE_AREA),
    ("attendCount", FIELD_ATTEND_COUNT),
    ("回数", FIELD_ATTEND_COUNT),
    ("参加回数", FIELD_ATTEND_COUNT),
    ("merchAmount", FIELD_MERCH_AMOUNT),
    ("merchAmountJPY", FIELD_MERCH_AMOUNT),
    ("物販", FIELD_MERCH_AMOUNT),
    ("物販(円)", FIELD_MERCH_AMOUNT),
    ("物販金額", FIELD_MERCH_AMOUNT),
    ("donationAmount", FIELD_DONATION_AMOUNT),
    ("superchatAmountJPY", FIELD_DONATION_AMOUNT),
    ("スパチャ", FIELD_DONATION_AMOUNT),
    ("スパチャ(円)", FIELD_DONATION_AMOUNT),
    ("スパチャ金額", FIELD_DONATION_AMOUNT),
    ("note", FIELD_NOTE),
    ("メモ", FIELD_NOTE),
    ("備考", FIELD_NOTE),
];

fn lookup(table: &[(&str, &'static str)], header: &str) -> Option<&'static str> {
    let header = header.trim();
    table
        .iter()
        .find(|(alias, _)| *alias == header)
        .map(|(_, field)| *field)
}

/// Canonical field for a fan import header, if recognized.
pub fn fan_field(header: &str) -> Option<&'static str> {
    lookup(FAN_HEADERS, header)
}

/// Canonical field for a log import header, if recognized.
pub fn log_field(header: &str) -> Option<&'static str> {
    lookup(LOG_HEADERS, header)
}

pub fn event_type_from_label(label: &str) -> Option<EventType> {
    match label.trim() {
        "有料ライブ" => Some(EventType::PaidLive),
        "フリーライブ" => Some(EventType::FreeLive),
        "有料配信" => Some(EventType::PaidStream),
        "youtube" => Some(EventType::YouTube),
        other => other.parse().ok(),
    }
}

pub fn area_from_label(label: &str) -> Option<Area> {
    match label.trim() {
        "神戸" => Some(Area::Kobe),
        "大阪" => Some(Area::Osaka),
        "奈良" => Some(Area::Nara),
        "東京" => Some(Area::Tokyo),
        "水戸" => Some(Area::Mito),
        "四国" => Some(Area::Shikoku),
        "その他" => Some(Area::Other),
        "オンライン" => Some(Area::Online),
        other => other.parse().ok(),
    }
}
