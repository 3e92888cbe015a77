//! County name match keys.
//!
//! Temperature and rent tables do not always carry a usable FIPS code, so
//! the merge pipeline falls back to matching on a normalized
//! `"{county}|{state_abbr}"` key. Normalization has to absorb the
//! formatting quirks of each upstream table: quoted fields, a leading
//! `"AL: "` state prefix (NOAA), a trailing `", Alabama"` state tail
//! (Census), and jurisdiction suffixes like "County" or "Parish".

use regex::Regex;

use crate::fips;

/// Normalizes a state given as either a postal abbreviation or a full
/// name to a lowercase two-letter abbreviation.
///
/// Unrecognized names pass through lowercased so that two tables sharing
/// the same unknown spelling still match each other.
#[must_use]
pub fn normalize_state(state: &str) -> String {
    let cleaned = state.trim().trim_matches('"').trim();
    if cleaned.len() == 2 {
        return cleaned.to_ascii_lowercase();
    }
    fips::name_to_abbr(cleaned).map_or_else(|| cleaned.to_ascii_lowercase(), str::to_ascii_lowercase)
}

/// Strips a trailing jurisdiction suffix ("County", "Parish", "Borough",
/// "Municipality", "Municipio", "Census Area") from a county name.
#[must_use]
pub fn strip_jurisdiction_suffix(name: &str) -> String {
    let re = Regex::new(r"(?i)\s+(county|parish|borough|municipality|municipio|census area)$")
        .unwrap_or_else(|_| unreachable!());
    re.replace(name.trim(), "").trim().to_string()
}

/// Builds the lowercase `"{county}|{state_abbr}"` key used for
/// name-based merge fallback.
///
/// Handles `"AL: Autauga"` (state-prefixed), `"Autauga County, Alabama"`
/// (state tail after a comma), and plain `"Autauga County"` forms; all
/// three produce `"autauga|al"`.
#[must_use]
pub fn county_key(county: &str, state: &str) -> String {
    let mut cleaned = county.trim().trim_matches('"').trim().to_string();

    let prefix_re = Regex::new(r"^[A-Z]{2}:\s*").unwrap_or_else(|_| unreachable!());
    cleaned = prefix_re.replace(&cleaned, "").to_string();

    if let Some((county_part, _state_tail)) = cleaned.split_once(',') {
        cleaned = county_part.trim().to_string();
    }

    let county_part = strip_jurisdiction_suffix(&cleaned).to_ascii_lowercase();
    let state_part = normalize_state(state);

    format!("{county_part}|{state_part}")
}

/// Splits a NOAA-style `"AL: Autauga"` county label into its postal
/// abbreviation and bare name.
///
/// Returns `None` when the label has no `"XX: "` prefix.
#[must_use]
pub fn split_state_prefix(label: &str) -> Option<(&str, &str)> {
    let (state, county) = label.split_once(':')?;
    let state = state.trim().trim_matches('"');
    if state.len() != 2 || !state.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some((state, county.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_abbreviations_pass_through_lowercased() {
        assert_eq!(normalize_state("AL"), "al");
        assert_eq!(normalize_state("al"), "al");
        assert_eq!(normalize_state("\"TX\""), "tx");
    }

    #[test]
    fn full_state_names_map_to_abbreviations() {
        assert_eq!(normalize_state("Alabama"), "al");
        assert_eq!(normalize_state("new hampshire"), "nh");
        assert_eq!(normalize_state("District of Columbia"), "dc");
    }

    #[test]
    fn unknown_states_lowercase() {
        assert_eq!(normalize_state("Guam Territory"), "guam territory");
    }

    #[test]
    fn suffixes_stripped() {
        assert_eq!(strip_jurisdiction_suffix("Autauga County"), "Autauga");
        assert_eq!(strip_jurisdiction_suffix("Acadia Parish"), "Acadia");
        assert_eq!(strip_jurisdiction_suffix("North Slope Borough"), "North Slope");
        assert_eq!(strip_jurisdiction_suffix("Anchorage Municipality"), "Anchorage");
        assert_eq!(strip_jurisdiction_suffix("Bethel Census Area"), "Bethel");
        assert_eq!(strip_jurisdiction_suffix("Plain Name"), "Plain Name");
    }

    #[test]
    fn county_key_handles_all_formats() {
        assert_eq!(county_key("Autauga County", "Alabama"), "autauga|al");
        assert_eq!(county_key("Autauga County, Alabama", "Alabama"), "autauga|al");
        assert_eq!(county_key("AL: Autauga", "AL"), "autauga|al");
        assert_eq!(county_key("\"Baldwin County\"", "AL"), "baldwin|al");
    }

    #[test]
    fn county_key_is_case_insensitive() {
        assert_eq!(
            county_key("AUTAUGA COUNTY", "ALABAMA"),
            county_key("Autauga County", "Alabama")
        );
    }

    #[test]
    fn state_prefix_splitting() {
        assert_eq!(split_state_prefix("AL: Autauga"), Some(("AL", "Autauga")));
        assert_eq!(split_state_prefix("Autauga County"), None);
        assert_eq!(split_state_prefix("Anchorage: north"), None);
    }
}
