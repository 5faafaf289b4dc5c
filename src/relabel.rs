//! # Catalog Relabeling
//!
//! Declarative rules that fill attribute columns from patterns found in
//! other columns, such as deriving the `drug` column from the experiment
//! name. Rules run in table order, so when several rules write the same
//! field the last matching one wins.
//!
//! Rule tables deserialize from TOML:
//!
//! ```toml
//! [[relabel]]
//! field_matched = "experiment_name"
//! pattern = { contains_ignore_case = "gabazine" }
//! target_field = "drug"
//! value = "gabazine"
//! ```

use log::debug;
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogError, EXPERIMENT_COLUMN, UUID_COLUMN};

/// How a rule tests the matched field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Match {
    /// Whole value equals the text
    Exact(String),
    /// Value contains any of the fragments, case-sensitively
    Contains(Vec<String>),
    /// Value contains the fragment, ignoring ASCII case
    ContainsIgnoreCase(String),
}

impl Match {
    /// Test a field value
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Match::Exact(text) => value == text,
            Match::Contains(fragments) => fragments.iter().any(|f| value.contains(f.as_str())),
            Match::ContainsIgnoreCase(fragment) => value
                .to_ascii_lowercase()
                .contains(&fragment.to_ascii_lowercase()),
        }
    }
}

/// Set `target_field` to `value` on rows whose `field_matched` matches `pattern`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelabelRule {
    /// Column tested by the pattern
    pub field_matched: String,
    /// Test applied to the column value
    pub pattern: Match,
    /// Column written on a match
    pub target_field: String,
    /// Value written on a match
    pub value: String,
}

impl RelabelRule {
    /// Build a rule
    pub fn new(
        field_matched: impl Into<String>,
        pattern: Match,
        target_field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field_matched: field_matched.into(),
            pattern,
            target_field: target_field.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of relabel rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<RelabelRule>,
}

impl RuleTable {
    /// Table from rules in application order
    pub fn new(rules: Vec<RelabelRule>) -> Self {
        Self { rules }
    }

    /// Drug labels inferred from experiment names
    pub fn drug_from_experiment_name() -> Self {
        let ignore_case = |fragment: &str, drug: &str| {
            RelabelRule::new(
                EXPERIMENT_COLUMN,
                Match::ContainsIgnoreCase(fragment.to_string()),
                "drug",
                drug,
            )
        };
        Self::new(vec![
            RelabelRule::new(
                EXPERIMENT_COLUMN,
                Match::Contains(vec!["nosynaptic".to_string()]),
                "drug",
                "nbqx + apv + gabazine",
            ),
            ignore_case("gabazine", "gabazine"),
            ignore_case("bicuculline", "bicuculline"),
            ignore_case("apv", "apv"),
            ignore_case("dmso", "dmso"),
            ignore_case("cch", "carbachol"),
            ignore_case("baseline", "baseline"),
            ignore_case("nbqx", "nbqx"),
            ignore_case("dopamine", "dopamine"),
            ignore_case("gaba", "gaba"),
            ignore_case("carbachol", "carbachol"),
        ])
    }

    /// Append a rule
    pub fn push(&mut self, rule: RelabelRule) {
        self.rules.push(rule);
    }

    /// Rules in application order
    pub fn rules(&self) -> &[RelabelRule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to every row, returning the number of field writes
    ///
    /// Rows without the matched field are skipped. Nothing is written when
    /// any rule targets an identity column.
    pub fn apply(&self, catalog: &mut Catalog) -> Result<usize, CatalogError> {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.target_field == UUID_COLUMN || r.target_field == EXPERIMENT_COLUMN)
        {
            return Err(CatalogError::ImmutableField(rule.target_field.clone()));
        }

        let mut writes = 0;
        for rule in &self.rules {
            catalog.ensure_column(&rule.target_field);
            let mut matched = 0;
            for row in catalog.rows_mut() {
                let hit = row
                    .field(&rule.field_matched)
                    .is_some_and(|value| rule.pattern.matches(value));
                if hit {
                    row.set_field(&rule.target_field, rule.value.as_str())?;
                    matched += 1;
                }
            }
            debug!(
                "Rule {} -> {}={} matched {} rows",
                rule.field_matched, rule.target_field, rule.value, matched
            );
            writes += matched;
        }
        Ok(writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRow;

    fn catalog() -> Catalog {
        Catalog::from_rows(vec![
            CatalogRow::new("u1", "Trace_day22_Gabazine_dorsal").with_attribute("sample_type", "organoid"),
            CatalogRow::new("u1", "Trace_day22_nosynaptic"),
            CatalogRow::new("u2", "Trace_day30_DMSO_baseline").with_attribute("sample_type", "mouse slice"),
            CatalogRow::new("u2", "Trace_day30_plain"),
        ])
        .unwrap()
    }

    #[test]
    fn test_match_kinds() {
        assert!(Match::Exact("kh2".into()).matches("kh2"));
        assert!(!Match::Exact("kh2".into()).matches("KH2"));
        assert!(Match::Contains(vec!["slice".into(), "organoid".into()]).matches("P0 mouse slice"));
        assert!(!Match::Contains(vec!["Slice".into()]).matches("mouse slice"));
        assert!(Match::ContainsIgnoreCase("cch".into()).matches("Trace_CCH_10uM"));
    }

    #[test]
    fn test_drug_table() {
        let mut catalog = catalog();
        let writes = RuleTable::drug_from_experiment_name().apply(&mut catalog).unwrap();

        let drug = |name: &str| catalog.get(name).unwrap().field("drug").map(str::to_string);
        assert_eq!(drug("Trace_day22_Gabazine_dorsal").as_deref(), Some("gaba"));
        assert_eq!(drug("Trace_day22_nosynaptic").as_deref(), Some("nbqx + apv + gabazine"));
        assert_eq!(drug("Trace_day30_DMSO_baseline").as_deref(), Some("baseline"));
        assert_eq!(drug("Trace_day30_plain"), None);
        assert_eq!(writes, 5);
        assert!(catalog.columns().iter().any(|c| c == "drug"));
    }

    #[test]
    fn test_last_match_wins() {
        let mut catalog = catalog();
        let table = RuleTable::new(vec![
            RelabelRule::new("sample_type", Match::Contains(vec!["slice".into()]), "species", "mouse"),
            RelabelRule::new("sample_type", Match::Exact("organoid".into()), "species", "organoid"),
            RelabelRule::new("sample_type", Match::ContainsIgnoreCase("MOUSE".into()), "species", "mus musculus"),
        ]);
        assert_eq!(table.apply(&mut catalog).unwrap(), 3);

        let species = |name: &str| catalog.get(name).unwrap().field("species").map(str::to_string);
        assert_eq!(species("Trace_day30_DMSO_baseline").as_deref(), Some("mus musculus"));
        assert_eq!(species("Trace_day22_Gabazine_dorsal").as_deref(), Some("organoid"));
        assert_eq!(species("Trace_day30_plain"), None);
    }

    #[test]
    fn test_identity_target_rejected() {
        let mut catalog = catalog();
        let table = RuleTable::new(vec![
            RelabelRule::new("sample_type", Match::Exact("organoid".into()), "cell_line", "kh2"),
            RelabelRule::new("sample_type", Match::Exact("organoid".into()), UUID_COLUMN, "x"),
        ]);
        assert!(matches!(
            table.apply(&mut catalog),
            Err(CatalogError::ImmutableField(ref c)) if c == UUID_COLUMN
        ));
        assert!(catalog.rows().iter().all(|r| r.field("cell_line").is_none()));
    }

    #[test]
    fn test_rules_from_toml() {
        #[derive(Deserialize)]
        struct File {
            relabel: RuleTable,
        }

        let file: File = toml::from_str(
            r#"
            [[relabel]]
            field_matched = "experiment_name"
            pattern = { contains = ["nosynaptic", "nosyn"] }
            target_field = "drug"
            value = "nbqx + apv + gabazine"

            [[relabel]]
            field_matched = "uuids"
            pattern = { exact = "u2" }
            target_field = "cell_line"
            value = "E14"
            "#,
        )
        .unwrap();

        assert_eq!(file.relabel.len(), 2);
        assert_eq!(
            file.relabel.rules()[0].pattern,
            Match::Contains(vec!["nosynaptic".into(), "nosyn".into()])
        );

        let mut catalog = catalog();
        file.relabel.apply(&mut catalog).unwrap();
        assert_eq!(catalog.get("Trace_day30_plain").unwrap().field("cell_line"), Some("E14"));
    }
}
