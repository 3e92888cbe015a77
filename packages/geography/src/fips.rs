//! US state FIPS code utilities.
//!
//! Provides mappings between two-digit FIPS codes, two-letter postal
//! abbreviations, and full state names for the 50 US states + DC, plus
//! normalization of raw county FIPS strings from upstream tables.

/// (FIPS code, postal abbreviation, full name) for the 50 states + DC.
pub const STATES: &[(&str, &str, &str)] = &[
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
];

/// Puerto Rico's state FIPS prefix. Territories are excluded from the
/// final dataset.
pub const PUERTO_RICO_PREFIX: &str = "72";

/// Maps a two-digit state FIPS code to the postal abbreviation.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_abbr(fips: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(code, _, _)| *code == fips)
        .map(|(_, abbr, _)| *abbr)
}

/// Maps a two-digit state FIPS code to the full state name.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_name(fips: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(code, _, _)| *code == fips)
        .map(|(_, _, name)| *name)
}

/// Maps a two-letter postal abbreviation (any case) to the state FIPS
/// code.
///
/// Returns `None` for unrecognized abbreviations.
#[must_use]
pub fn abbr_to_fips(abbr: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(_, a, _)| a.eq_ignore_ascii_case(abbr))
        .map(|(code, _, _)| *code)
}

/// Maps a full state name (any case) to the postal abbreviation.
///
/// Returns `None` for unrecognized names.
#[must_use]
pub fn name_to_abbr(name: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(_, _, n)| n.eq_ignore_ascii_case(name))
        .map(|(_, abbr, _)| *abbr)
}

/// Normalizes a raw county FIPS string to the canonical zero-padded
/// 5-digit form.
///
/// Upstream tables carry FIPS codes inconsistently: sometimes quoted,
/// sometimes with the leading zero dropped (`"1001"` for Autauga County).
/// Returns `None` when the input is empty, longer than 5 digits, or not
/// numeric.
#[must_use]
pub fn normalize_county_fips(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches('"');
    if cleaned.is_empty() || cleaned.len() > 5 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{cleaned:0>5}"))
}

/// Whether a normalized 5-digit county FIPS belongs to Puerto Rico.
#[must_use]
pub fn is_puerto_rico(fips: &str) -> bool {
    fips.starts_with(PUERTO_RICO_PREFIX)
}
