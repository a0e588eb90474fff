//! Known EPD impact indicators and the matcher that finds them in table rows.
//!
//! The table is static and never mutated, so it is shared freely between
//! threads. Synonyms are spelled the way they appear in Dutch and English
//! EPD documents; matching is ASCII case-insensitive.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorGroup {
    Core,
    Resource,
    Waste,
    OutputFlow,
    Aggregate,
}

/// Which SBK set(s) declare an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetMembership {
    Set1,
    Set2,
    Both,
}

impl SetMembership {
    pub fn includes(self, set_number: u8) -> bool {
        matches!(
            (self, set_number),
            (SetMembership::Both, _) | (SetMembership::Set1, 1) | (SetMembership::Set2, 2)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndicatorDef {
    pub code: &'static str,
    pub synonyms: &'static [&'static str],
    pub label: &'static str,
    pub unit: &'static str,
    pub group: IndicatorGroup,
    pub sets: SetMembership,
}

const fn def(
    code: &'static str,
    synonyms: &'static [&'static str],
    label: &'static str,
    unit: &'static str,
    group: IndicatorGroup,
    sets: SetMembership,
) -> IndicatorDef {
    IndicatorDef {
        code,
        synonyms,
        label,
        unit,
        group,
        sets,
    }
}

use IndicatorGroup::*;
use SetMembership::*;

#[rustfmt::skip]
pub static INDICATORS: &[IndicatorDef] = &[
    // EN 15804+A1 (SBK set 1)
    def("ADPE", &["ADPE", "ADP-E", "ADP elements", "ADP-elementen"], "Abiotic depletion, non-fuel", "kg Sb eq", Core, Set1),
    def("ADPF", &["ADPF", "ADP fossil fuels", "ADP-fossiele brandstoffen"], "Abiotic depletion, fuel", "kg Sb eq", Core, Set1),
    def("GWP", &["GWP", "GWP100", "GWP-100"], "Global warming", "kg CO2 eq", Core, Set1),
    def("EP", &["EP"], "Eutrophication", "kg PO4 eq", Core, Set1),
    def("HTP", &["HTP"], "Human toxicity", "kg 1,4-DB eq", Core, Set1),
    def("FAETP", &["FAETP"], "Fresh water aquatic ecotoxicity", "kg 1,4-DB eq", Core, Set1),
    def("MAETP", &["MAETP"], "Marine aquatic ecotoxicity", "kg 1,4-DB eq", Core, Set1),
    def("TETP", &["TETP"], "Terrestrial ecotoxicity", "kg 1,4-DB eq", Core, Set1),
    // Shared by both sets
    def("ODP", &["ODP"], "Ozone layer depletion", "kg CFC11 eq", Core, Both),
    def("POCP", &["POCP"], "Photochemical oxidation", "kg C2H4 eq", Core, Both),
    def("AP", &["AP"], "Acidification", "kg SO2 eq", Core, Both),
    // EN 15804+A2 (SBK set 2)
    def("GWP-TOTAL", &["GWP-total", "GWP total", "GWP-tot"], "Climate change, total", "kg CO2 eq", Core, Set2),
    def("GWP-F", &["GWP-fossil", "GWP fossil", "GWP-fossiel", "GWP-f"], "Climate change, fossil", "kg CO2 eq", Core, Set2),
    def("GWP-B", &["GWP-biogenic", "GWP-biogeen", "GWP biogenic", "GWP-bio", "GWP-b"], "Climate change, biogenic", "kg CO2 eq", Core, Set2),
    def("GWP-LULUC", &["GWP-luluc", "GWP luluc"], "Climate change, land use and land use change", "kg CO2 eq", Core, Set2),
    def("EP-FW", &["EP-freshwater", "EP-zoetwater", "EP-fw"], "Eutrophication, freshwater", "kg P eq", Core, Set2),
    def("EP-M", &["EP-marine", "EP-zoutwater", "EP-m"], "Eutrophication, marine", "kg N eq", Core, Set2),
    def("EP-T", &["EP-terrestrial", "EP-terrestrisch", "EP-t"], "Eutrophication, terrestrial", "mol N eq", Core, Set2),
    def("ADP-MM", &["ADP-minerals&metals", "ADP-minerals & metals", "ADP-mineralen & metalen", "ADP-mineralen&metalen", "ADP-mm"], "Abiotic depletion, minerals and metals", "kg Sb eq", Core, Set2),
    def("ADP-F", &["ADP-fossil", "ADP-fossiel", "ADP-f"], "Abiotic depletion, fossil resources", "MJ", Core, Set2),
    def("WDP", &["WDP"], "Water use", "m3 world eq deprived", Core, Set2),
    def("PM", &["PM"], "Particulate matter emissions", "disease incidence", Core, Set2),
    def("IRP", &["IRP", "IR"], "Ionising radiation, human health", "kBq U235 eq", Core, Set2),
    def("ETP-FW", &["ETP-freshwater", "ETP-fw"], "Ecotoxicity, freshwater", "CTUe", Core, Set2),
    def("HTP-C", &["HTP-cancer", "HTP-c"], "Human toxicity, cancer effects", "CTUh", Core, Set2),
    def("HTP-NC", &["HTP-non-cancer", "HTP-non cancer", "HTP-nc"], "Human toxicity, non-cancer effects", "CTUh", Core, Set2),
    def("SQP", &["SQP"], "Land use related impacts / soil quality", "dimensionless", Core, Set2),
    // Monetised aggregate
    def("MKI", &["MKI"], "Milieukostenindicator", "Euro", Aggregate, Both),
    def("ECI", &["ECI"], "Environmental cost indicator", "Euro", Aggregate, Both),
    // Resource use
    def("PERE", &["PERE"], "Renewable primary energy as energy carrier", "MJ", Resource, Both),
    def("PERM", &["PERM"], "Renewable primary energy resources as material", "MJ", Resource, Both),
    def("PERT", &["PERT"], "Total renewable primary energy", "MJ", Resource, Both),
    def("PENRE", &["PENRE"], "Non-renewable primary energy as energy carrier", "MJ", Resource, Both),
    def("PENRM", &["PENRM"], "Non-renewable primary energy as material", "MJ", Resource, Both),
    def("PENRT", &["PENRT"], "Total non-renewable primary energy", "MJ", Resource, Both),
    def("SM", &["SM"], "Use of secondary material", "kg", Resource, Both),
    def("RSF", &["RSF"], "Use of renewable secondary fuels", "MJ", Resource, Both),
    def("NRSF", &["NRSF"], "Use of non-renewable secondary fuels", "MJ", Resource, Both),
    def("FW", &["FW"], "Net use of fresh water", "m3", Resource, Both),
    // Waste categories
    def("HWD", &["HWD"], "Hazardous waste disposed", "kg", Waste, Both),
    def("NHWD", &["NHWD"], "Non-hazardous waste disposed", "kg", Waste, Both),
    def("RWD", &["RWD"], "Radioactive waste disposed", "kg", Waste, Both),
    // Output flows
    def("CRU", &["CRU"], "Components for re-use", "kg", OutputFlow, Both),
    def("MFR", &["MFR"], "Materials for recycling", "kg", OutputFlow, Both),
    def("MER", &["MER"], "Materials for energy recovery", "kg", OutputFlow, Both),
    def("EEE", &["EEE"], "Exported electrical energy", "MJ", OutputFlow, Both),
    def("EET", &["EET"], "Exported thermal energy", "MJ", OutputFlow, Both),
];

/// Upper-cased synonym (and code) -> indicator definition.
static BY_SYNONYM: LazyLock<HashMap<String, &'static IndicatorDef>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    for def in INDICATORS {
        m.insert(def.code.to_string(), def);
        for syn in def.synonyms {
            m.entry(syn.to_ascii_uppercase()).or_insert(def);
        }
    }
    m
});

/// Look up an indicator by canonical code or any known synonym.
pub fn lookup(raw: &str) -> Option<&'static IndicatorDef> {
    BY_SYNONYM.get(raw.trim().to_ascii_uppercase().as_str()).copied()
}

/// Indicators declared under the given SBK set (1 or 2).
pub fn for_set(set_number: u8) -> impl Iterator<Item = &'static IndicatorDef> {
    INDICATORS.iter().filter(move |d| d.sets.includes(set_number))
}

/// True for indicators that only exist under SBK set 2 (EN 15804+A2).
pub fn is_set2_only(code: &str) -> bool {
    lookup(code).is_some_and(|d| d.sets == SetMembership::Set2)
}

/// Default unit for a canonical code, if known.
pub fn default_unit(code: &str) -> Option<&'static str> {
    lookup(code).map(|d| d.unit)
}

/// Where an indicator was found inside a line (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorHit {
    pub code: &'static str,
    pub start: usize,
    pub end: usize,
}

/// Finds indicator codes at the start of (or as a whole word inside) a table line.
///
/// Synonyms are tried longest first so `GWP-luluc` wins over `GWP` and
/// `ADP-f` over `AP`-style short codes.
#[derive(Debug, Clone)]
pub struct IndicatorMatcher {
    /// (upper-cased synonym, canonical code), longest synonym first.
    synonyms: Vec<(String, &'static str)>,
}

/// Short codes (AP, EP, PM, ...) are only accepted at the start of a line.
const MIN_INLINE_LEN: usize = 3;

impl IndicatorMatcher {
    pub fn new<'a>(defs: impl IntoIterator<Item = &'a IndicatorDef>) -> Self {
        let mut synonyms: Vec<(String, &'static str)> = Vec::new();
        for d in defs {
            let code = d.code;
            for syn in d.synonyms.iter().copied().chain(std::iter::once(d.code)) {
                let upper = syn.to_ascii_uppercase();
                if !synonyms.iter().any(|(s, _)| *s == upper) {
                    synonyms.push((upper, code));
                }
            }
        }
        synonyms.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        IndicatorMatcher { synonyms }
    }

    /// Matcher over every indicator declared for the given set.
    pub fn for_set(set_number: u8) -> Self {
        IndicatorMatcher::new(for_set(set_number))
    }

    /// Matcher over the whole table.
    pub fn all() -> Self {
        IndicatorMatcher::new(INDICATORS.iter())
    }

    /// Find the indicator a line belongs to.
    ///
    /// A line that starts with a synonym wins; otherwise the earliest whole-word
    /// occurrence of a synonym of at least three characters is used.
    pub fn find(&self, line: &str) -> Option<IndicatorHit> {
        let upper = line.to_ascii_uppercase();

        for (syn, code) in &self.synonyms {
            if upper.starts_with(syn.as_str())
                && boundary_after(&upper, syn.len())
                && !is_gwp_luluc_at(&upper, 0, code)
            {
                return Some(IndicatorHit {
                    code,
                    start: 0,
                    end: syn.len(),
                });
            }
        }

        let mut best: Option<IndicatorHit> = None;
        for (syn, code) in &self.synonyms {
            if syn.len() < MIN_INLINE_LEN {
                continue;
            }
            for (pos, _) in upper.match_indices(syn.as_str()) {
                if !boundary_before(&upper, pos)
                    || !boundary_after(&upper, pos + syn.len())
                    || is_gwp_luluc_at(&upper, pos, code)
                {
                    continue;
                }
                // Longer synonyms come first, so only a strictly earlier hit replaces.
                if best.as_ref().map_or(true, |b| pos < b.start) {
                    best = Some(IndicatorHit {
                        code,
                        start: pos,
                        end: pos + syn.len(),
                    });
                }
                break;
            }
        }
        best
    }
}

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-'
}

fn boundary_before(upper: &str, pos: usize) -> bool {
    pos == 0 || !is_word_char(upper.as_bytes()[pos - 1])
}

fn boundary_after(upper: &str, end: usize) -> bool {
    upper
        .as_bytes()
        .get(end)
        .map_or(true, |&c| !is_word_char(c))
}

/// Bare `GWP` must never claim a `GWP-LULUC` row, even when the caller's
/// indicator set does not contain GWP-LULUC itself.
pub fn is_gwp_luluc_at(upper: &str, pos: usize, code: &str) -> bool {
    code != "GWP-LULUC"
        && code.starts_with("GWP")
        && upper[pos..].starts_with("GWP")
        && upper[pos + 3..]
            .trim_start_matches([' ', '-', '_'])
            .starts_with("LULUC")
}
