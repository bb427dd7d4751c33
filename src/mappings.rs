//! Value harmonization tables for the salary survey
//!
//! Survey answers are free text. [`MappingTables::survey`] builds the fixed
//! literal and regex tables once; the cleaner receives them by reference.
//! All keys and values are lowercase because matching happens after the
//! cleaner lowercases and trims every categorical value.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::error::{PreprocessError, Result};
use crate::schema::{CITY, COMPANY_SIZE, COMPANY_TYPE, GENDER, POSITION, SENIORITY};

const GENDER_MAPPING: &[(&str, &str)] = &[("M", "male"), ("F", "female"), ("D", "diverse")];

const CITY_MAPPING: &[(&str, &str)] = &[
    ("München", "Munich"),
    ("Köln", "Cologne"),
    ("Nürnberg", "Nuremberg"),
    ("Düsseldorf", "Dusseldorf"),
    ("Kiev", "Kyiv"),
    ("Saint-Petersburg", "Saint Petersburg"),
];

const POSITION_MAPPING: &[(&str, &str)] = &[
    ("QA", "QA Engineer"),
    ("ML Engineer", "Machine Learning Engineer"),
    ("Backend Engineer", "Backend Developer"),
    ("Frontend Engineer", "Frontend Developer"),
    ("Front End Developer", "Frontend Developer"),
    ("Python Dev", "Software Developer"),
    ("Devops", "Devops Engineer"),
    ("Lead Devops", "Devops Engineer"),
    ("Full Stack Developer", "Fullstack Developer"),
    ("Full-Stack Developer", "Fullstack Developer"),
    ("Fullstack", "Fullstack Developer"),
    ("Developer", "Software Developer"),
    ("Big Data Engineer", "Data Engineer"),
    ("Lead Software Engineer", "Software Engineer"),
    ("Principal Software Engineer", "Software Engineer"),
    ("Web Developer", "Frontend Developer"),
    ("iOS Developer", "Mobile Developer"),
    ("Android Developer", "Mobile Developer"),
    ("SRE", "Site Reliability Engineer"),
    ("CTO (CEO, CFO)", "CTO"),
    ("Designer (UI/UX)", "UI, UX Designer"),
    ("Designer (UI, UX)", "UI, UX Designer"),
    ("UI/UX Designer", "UI, UX Designer"),
    ("UX Designer", "UI, UX Designer"),
    ("Head of Engineering", "Manager"),
    ("PM", "Manager"),
];

/// Patterns are anchored and compiled case-insensitive.
const POSITION_REGEX_MAPPING: &[(&str, &str)] = &[
    (
        r"^(?:java|python|php|\.net|c\+\+|scala|ruby|javascript|c#|oracle|go|golang)\s*(?:software)?\s*(?:developer)$",
        "Software Developer",
    ),
    (
        r"^(?:product|project|qa|it|engineering|program|devops|operations|team|technical product|technical project)\s*(?:manager)$",
        "Manager",
    ),
    (r"^(?:sap|bi|sap bw|it)\s*(?:consultant)$", "Consultant"),
    (
        r"^(?:solution|solutions|cloud|it|qa ta|system)\s*(?:architect)$",
        "Architect",
    ),
];

const SENIORITY_MAPPING: &[(&str, &str)] = &[
    ("Working Student", "Student"),
    ("Intern", "Student"),
    ("Entry Level", "Junior"),
];

const COMPANY_TYPE_MAPPING: &[(&str, &str)] = &[
    ("Consulting / Agency", "Consulting or Agency"),
    ("Agency", "Consulting or Agency"),
    ("Consulting", "Consulting or Agency"),
    ("ECommerce", "E-Commerce"),
    ("Bank", "Finance"),
    ("Fintech", "Finance"),
    ("Financial", "Finance"),
    ("University", "Research and Education"),
    ("Research", "Research and Education"),
    ("Education", "Research and Education"),
    ("Research Institute", "Research and Education"),
    ("Institute", "Research and Education"),
    ("IT-Outsourcing", "Outsource"),
    ("Outsource", "Outsource"),
    ("Bodyshop / Outsource", "Outsource"),
    ("Outsourse", "Outsource"),
    ("Outsorce", "Outsource"),
];

const COMPANY_SIZE_MAPPING: &[(&str, &str)] = &[
    ("10-50", "1-100"),
    ("up to 10", "1-100"),
    ("11-50", "1-100"),
    ("51-100", "1-100"),
    ("50-100", "1-100"),
    ("100-1000", "101-1000"),
];

/// Immutable literal and regex tables keyed by column name
#[derive(Debug, Clone, Default)]
pub struct MappingTables {
    literal: HashMap<String, HashMap<String, String>>,
    patterns: HashMap<String, Vec<(Regex, String)>>,
}

impl MappingTables {
    /// Tables with no mappings; unification then only lowercases and trims.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The harmonization tables for the salary survey fields
    pub fn survey() -> Result<Self> {
        let mut tables = Self::empty();
        tables.insert_literal(GENDER, GENDER_MAPPING);
        tables.insert_literal(CITY, CITY_MAPPING);
        tables.insert_literal(POSITION, POSITION_MAPPING);
        tables.insert_literal(SENIORITY, SENIORITY_MAPPING);
        tables.insert_literal(COMPANY_TYPE, COMPANY_TYPE_MAPPING);
        tables.insert_literal(COMPANY_SIZE, COMPANY_SIZE_MAPPING);
        tables.insert_patterns(POSITION, POSITION_REGEX_MAPPING)?;
        Ok(tables)
    }

    /// Add literal replacements for a column; keys and values are lowercased.
    pub fn insert_literal(&mut self, column: &str, pairs: &[(&str, &str)]) {
        let entry = self.literal.entry(column.to_string()).or_default();
        for (from, to) in pairs {
            entry.insert(from.to_lowercase(), to.to_lowercase());
        }
    }

    /// Add case-insensitive whole-value patterns for a column.
    pub fn insert_patterns(&mut self, column: &str, pairs: &[(&str, &str)]) -> Result<()> {
        let entry = self.patterns.entry(column.to_string()).or_default();
        for (pattern, to) in pairs {
            let anchored = anchor(pattern);
            let regex = RegexBuilder::new(&anchored)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    PreprocessError::Configuration(format!(
                        "Invalid mapping pattern for column '{}': {}",
                        column, e
                    ))
                })?;
            entry.push((regex, to.to_lowercase()));
        }
        Ok(())
    }

    /// Replace a value using the literal table, then the first matching
    /// pattern. Values without a mapping are returned unchanged.
    pub fn apply<'a>(&'a self, column: &str, value: &'a str) -> &'a str {
        let value = self
            .literal
            .get(column)
            .and_then(|m| m.get(value))
            .map(String::as_str)
            .unwrap_or(value);

        self.patterns
            .get(column)
            .and_then(|patterns| {
                patterns
                    .iter()
                    .find(|(regex, _)| regex.is_match(value))
                    .map(|(_, to)| to.as_str())
            })
            .unwrap_or(value)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.literal.contains_key(column) || self.patterns.contains_key(column)
    }
}

fn anchor(pattern: &str) -> String {
    let start = if pattern.starts_with('^') { "" } else { "^" };
    let end = if pattern.ends_with('$') { "" } else { "$" };
    format!("{}(?:{}){}", start, pattern, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_mapping_is_lowercased() {
        let tables = MappingTables::survey().unwrap();
        assert_eq!(tables.apply(CITY, "münchen"), "munich");
        assert_eq!(tables.apply(COMPANY_SIZE, "up to 10"), "1-100");
        assert_eq!(tables.apply(GENDER, "f"), "female");
    }

    #[test]
    fn test_regex_mapping_matches_whole_value() {
        let tables = MappingTables::survey().unwrap();
        assert_eq!(tables.apply(POSITION, "python software developer"), "software developer");
        assert_eq!(tables.apply(POSITION, "project manager"), "manager");
        assert_eq!(tables.apply(POSITION, "senior project manager lead"), "senior project manager lead");
    }

    #[test]
    fn test_literal_applied_before_regex() {
        let mut tables = MappingTables::empty();
        tables.insert_literal("col", &[("a", "B")]);
        tables.insert_patterns("col", &[(r"b", "c")]).unwrap();
        assert_eq!(tables.apply("col", "a"), "c");
    }

    #[test]
    fn test_unmapped_column_passes_through() {
        let tables = MappingTables::survey().unwrap();
        assert!(!tables.has_column("Unknown"));
        assert_eq!(tables.apply("Unknown", "value"), "value");
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let mut tables = MappingTables::empty();
        let err = tables.insert_patterns("col", &[("(", "x")]).unwrap_err();
        assert!(matches!(err, PreprocessError::Configuration(_)));
    }
}
