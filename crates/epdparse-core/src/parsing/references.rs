//! PCR and background-database references.

use crate::model::{DatabaseInfo, PcrInfo};
use regex::Regex;
use std::sync::LazyLock;

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)+").expect("valid version regex"));

/// Words dropped from a PCR line to leave its name. Hyphenated forms such as
/// "NL-PCR" are part of the name and stay.
const PCR_NOISE: &[&str] = &["pcr", "versie", "version", "v", "v."];

/// "Nationale Milieudatabase versie 3.5", "NMD v3.6", "NMD 3.5".
static NMD_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:nationale\s+milieu\s*database|nmd)\b([^\d\n]{0,30}?)v?(\d+(?:\.\d+)+)")
        .expect("valid NMD version regex")
});

/// "EcoInvent 3.6", "ecoinvent v3.8", "Ecoinvent versie 3.5".
static ECOINVENT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\becoinvent\b([^\d\n]{0,20}?)v?(\d+(?:\.\d+)+)")
        .expect("valid ecoinvent version regex")
});

/// Split a free-text PCR line into a name and a version.
///
/// The first dotted-numeric token is the version. The name is what remains
/// after removing the version and the words "PCR"/"versie"/"version"; an empty
/// remainder falls back to `"PCR"`.
pub fn parse_pcr(raw: &str) -> PcrInfo {
    let version = VERSION_TOKEN.find(raw).map(|m| m.as_str().to_string());

    let without_version = match &version {
        Some(v) => raw.replacen(v.as_str(), " ", 1),
        None => raw.to_string(),
    };
    let kept: Vec<&str> = without_version
        .split_whitespace()
        .filter(|word| {
            let bare = word.trim_matches(|c: char| matches!(c, ':' | ',' | ';' | '(' | ')'));
            !PCR_NOISE.contains(&bare.to_lowercase().as_str())
        })
        .collect();
    let name = clean_name(&kept.join(" "));

    PcrInfo {
        name: if name.is_empty() { "PCR".to_string() } else { name },
        version,
    }
}

/// Collapse whitespace and trim separators left behind by stripping.
fn clean_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ',' | ':' | ';' | '(' | ')'))
        .to_string()
}

/// NMD version in `text`, skipping "NMD Bepalingsmethode 1.1"-style mentions
/// whose number is a method version, not a database version.
pub fn find_nmd_version(text: &str) -> Option<String> {
    NMD_VERSION.captures_iter(text).find_map(|caps| {
        let gap = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
        if gap.contains("bepaling") || gap.contains("methode") || gap.contains("method") {
            None
        } else {
            caps.get(2).map(|m| m.as_str().to_string())
        }
    })
}

pub fn find_ecoinvent_version(text: &str) -> Option<String> {
    ECOINVENT_VERSION
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Compose the canonical database reference.
///
/// Versions are looked up in the labeled value first, then in the whole
/// document. Found versions are joined as `"NMD vX | EcoInvent vY"`; without
/// any version the raw labeled text is kept as the label.
pub fn parse_database(labeled: Option<&str>, document: Option<&str>) -> Option<DatabaseInfo> {
    let search = |find: fn(&str) -> Option<String>| {
        labeled
            .and_then(find)
            .or_else(|| document.and_then(find))
    };
    let nmd_version = search(find_nmd_version);
    let ecoinvent_version = search(find_ecoinvent_version);

    let mut parts = Vec::new();
    if let Some(v) = &nmd_version {
        parts.push(format!("NMD v{v}"));
    }
    if let Some(v) = &ecoinvent_version {
        parts.push(format!("EcoInvent v{v}"));
    }

    let label = if parts.is_empty() {
        labeled.map(str::trim).filter(|s| !s.is_empty())?.to_string()
    } else {
        parts.join(" | ")
    };

    Some(DatabaseInfo {
        nmd_version,
        ecoinvent_version,
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcr_name_and_version() {
        let pcr = parse_pcr("PCR Asfalt versie 1.2");
        assert_eq!(pcr.name, "Asfalt");
        assert_eq!(pcr.version.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_pcr_only_version_falls_back() {
        let pcr = parse_pcr("PCR v2.0");
        assert_eq!(pcr.name, "PCR");
        assert_eq!(pcr.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_pcr_hyphenated_name_kept() {
        let pcr = parse_pcr("NL-PCR Asfalt 1.0");
        assert_eq!(pcr.name, "NL-PCR Asfalt");
        assert_eq!(pcr.version.as_deref(), Some("1.0"));
        assert_eq!(parse_pcr("PCR: Asfalt, v1.1").name, "Asfalt");
    }

    #[test]
    fn test_pcr_without_version() {
        let pcr = parse_pcr("Kunststof leidingsystemen");
        assert_eq!(pcr.name, "Kunststof leidingsystemen");
        assert_eq!(pcr.version, None);
    }

    #[test]
    fn test_database_both_versions() {
        let db = parse_database(
            Some("Nationale Milieudatabase versie 3.5 en Ecoinvent 3.6"),
            None,
        )
        .unwrap();
        assert_eq!(db.nmd_version.as_deref(), Some("3.5"));
        assert_eq!(db.ecoinvent_version.as_deref(), Some("3.6"));
        assert_eq!(db.label, "NMD v3.5 | EcoInvent v3.6");
    }

    #[test]
    fn test_database_from_document() {
        let doc = "Achtergrond: ecoinvent v3.8 cut-off";
        let db = parse_database(Some("NMD"), Some(doc)).unwrap();
        assert_eq!(db.label, "EcoInvent v3.8");
    }

    #[test]
    fn test_database_raw_fallback() {
        let db = parse_database(Some("Eigen database"), None).unwrap();
        assert_eq!(db.label, "Eigen database");
        assert!(parse_database(None, Some("niets")).is_none());
    }

    #[test]
    fn test_method_version_not_taken_as_nmd() {
        assert_eq!(find_nmd_version("NMD Bepalingsmethode 1.1"), None);
        assert_eq!(
            find_nmd_version("NMD Bepalingsmethode 1.1, NMD v3.5").as_deref(),
            Some("3.5")
        );
    }
}
