//! Localized String Tables
//!
//! One fixed table per language, resolved once at the boundary.
//! The renderer never branches on language: it receives `Strings::document()`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Nl,
    En,
}

impl Language {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "nl" => Some(Language::Nl),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub project_info: &'static str,
    pub project_name: &'static str,
    pub manufacturer: &'static str,
    pub work_order: &'static str,
    pub drawing: &'static str,
    pub revision: &'static str,
    pub part_line: &'static str,
    pub requirements: &'static str,
    pub test_pressure: &'static str,
    pub notes: &'static str,
    pub instrument_id: &'static str,
    pub calibration_date: &'static str,
    pub test_start: &'static str,
    pub test_end: &'static str,
    pub test_duration: &'static str,
    pub comp_duration: &'static str,
    pub equipment: &'static str,
    pub compartment: &'static str,
    pub date: &'static str,
    pub start_time: &'static str,
    pub start_pressure: &'static str,
    pub end_time: &'static str,
    pub end_pressure: &'static str,
    pub decay_rate: &'static str,
    pub result: &'static str,
    pub remarks: &'static str,
    pub pass: &'static str,
    pub fail: &'static str,
    pub photos: &'static str,
    pub start_caption: &'static str,
    pub end_caption: &'static str,
    pub exif_missing: &'static str,
    pub signature: &'static str,
    pub sign_name: &'static str,
    pub sign_company: &'static str,
    pub sign_date: &'static str,
    pub need_all: &'static str,
    pub hours: &'static str,
    pub minutes: &'static str,
}

static NL: Strings = Strings {
    title: "Druktest rapport",
    project_info: "Projectgegevens",
    project_name: "Projectnaam",
    manufacturer: "Fabrikant",
    work_order: "Werkorder / Inkooporder",
    drawing: "Tekening",
    revision: "Revisie",
    part_line: "Onderdeelnaam / Lijnsectie",
    requirements: "Testvereisten",
    test_pressure: "Testdruk (Pt)",
    notes: "Opmerkingen",
    instrument_id: "Meetinstrument ID",
    calibration_date: "Kalibratiedatum",
    test_start: "Start test",
    test_end: "Einde test",
    test_duration: "Testduur",
    comp_duration: "Testduur compartiment",
    equipment: "Registratie testapparatuur",
    compartment: "Compartiment",
    date: "Datum",
    start_time: "Start tijd",
    start_pressure: "Start druk (bar/PSI)",
    end_time: "Eindtijd",
    end_pressure: "Eind druk (bar/PSI)",
    decay_rate: "Drukverval (bar/h / PSI/h)",
    result: "Resultaat",
    remarks: "Opmerking",
    pass: "PASS",
    fail: "FAIL",
    photos: "Foto's per compartiment",
    start_caption: "Begintijd",
    end_caption: "Eindtijd",
    exif_missing: "EXIF ontbreekt \u{2013} timestamp = uploadmoment",
    signature: "Handtekening",
    sign_name: "Naam",
    sign_company: "Bedrijf",
    sign_date: "Datum ondertekening",
    need_all: "Vul alle verplichte velden in.",
    hours: "uur",
    minutes: "min",
};

static EN: Strings = Strings {
    title: "Pressure test report",
    project_info: "Project information",
    project_name: "Project name",
    manufacturer: "Manufacturer",
    work_order: "Work order / Purchase order",
    drawing: "Drawing",
    revision: "Revision",
    part_line: "Part name / Line section",
    requirements: "Test requirements",
    test_pressure: "Test pressure (Pt)",
    notes: "Remarks",
    instrument_id: "Instrument ID",
    calibration_date: "Calibration date",
    test_start: "Test start",
    test_end: "Test end",
    test_duration: "Test duration",
    comp_duration: "Compartment test duration",
    equipment: "Registration test equipment",
    compartment: "Compartment",
    date: "Date",
    start_time: "Start time",
    start_pressure: "Start pressure (bar/PSI)",
    end_time: "End time",
    end_pressure: "End pressure (bar/PSI)",
    decay_rate: "Decay rate (bar/h / PSI/h)",
    result: "Result",
    remarks: "Remarks",
    pass: "PASS",
    fail: "FAIL",
    photos: "Photos per compartment",
    start_caption: "Start time",
    end_caption: "End time",
    exif_missing: "EXIF missing \u{2013} timestamp = upload moment",
    signature: "Signature",
    sign_name: "Name",
    sign_company: "Company",
    sign_date: "Date",
    need_all: "Please complete all required fields.",
    hours: "h",
    minutes: "min",
};

impl Strings {
    pub fn for_language(language: Language) -> &'static Strings {
        match language {
            Language::Nl => &NL,
            Language::En => &EN,
        }
    }

    /// Certificates are always issued in English, whatever the operator used.
    pub fn document() -> &'static Strings {
        &EN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_is_english() {
        assert_eq!(Strings::document().title, "Pressure test report");
        assert_eq!(Strings::for_language(Language::Nl).title, "Druktest rapport");
    }

    #[test]
    fn test_section_labels_follow_language() {
        let nl = Strings::for_language(Language::Nl);
        assert_eq!(nl.requirements, "Testvereisten");
        assert_ne!(nl.requirements, Strings::document().requirements);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("de"), None);
    }
}
