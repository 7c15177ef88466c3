use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::RiskError;
use crate::schema::CategoricalField;

/// Fitted code table for one categorical field.
///
/// Codes are positions in `classes`, the way a label encoder assigns them
/// after sorting the values it saw at fit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    classes: Vec<String>,
    index: HashMap<String, i64>,
}

impl LabelTable {
    /// Fits a table from observed values: sorted, deduplicated.
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes = values.into_iter().map(Into::into).collect::<Vec<String>>();
        classes.sort();
        classes.dedup();
        Self::indexed(classes)
    }

    /// Rebuilds an already-fitted table. Class order is taken as given.
    pub fn from_classes(classes: Vec<String>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for label in &classes {
            if !seen.insert(label.as_str()) {
                return Err(format!("duplicate class `{label}`"));
            }
        }
        Ok(Self::indexed(classes))
    }

    fn indexed(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as i64))
            .collect();
        Self { classes, index }
    }

    pub fn encode(&self, label: &str) -> Option<i64> {
        self.index.get(label).copied()
    }

    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Process-wide label tables, one per categorical input.
///
/// Built once at start-up and shared read-only. Construction fails unless
/// every label the input form can produce is known, so a running registry
/// never has to fall back to a default code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoderRegistry {
    tables: BTreeMap<CategoricalField, LabelTable>,
}

impl CategoricalEncoderRegistry {
    pub fn new(raw: BTreeMap<String, Vec<String>>) -> Result<Self, RiskError> {
        let mut tables = BTreeMap::new();

        for (name, classes) in raw {
            let field = CategoricalField::parse(&name).ok_or_else(|| {
                RiskError::EncoderSchemaMismatch(format!("unexpected encoder field `{name}`"))
            })?;
            let table = LabelTable::from_classes(classes).map_err(|detail| {
                RiskError::EncoderSchemaMismatch(format!("{}: {detail}", field.name()))
            })?;
            if tables.insert(field, table).is_some() {
                return Err(RiskError::EncoderSchemaMismatch(format!(
                    "field {} listed twice",
                    field.name()
                )));
            }
        }

        let registry = Self { tables };
        registry.check_declared_domains()?;
        Ok(registry)
    }

    /// Registry fitted on exactly the declared input domains.
    pub fn fit_declared() -> Self {
        let tables = CategoricalField::ALL
            .into_iter()
            .map(|field| (field, LabelTable::fit(field.declared_labels().iter().copied())))
            .collect();
        Self { tables }
    }

    fn check_declared_domains(&self) -> Result<(), RiskError> {
        for field in CategoricalField::ALL {
            let table = self.tables.get(&field).ok_or_else(|| {
                RiskError::EncoderSchemaMismatch(format!("missing encoder for {}", field.name()))
            })?;

            let missing = field
                .declared_labels()
                .iter()
                .filter(|label| table.encode(label).is_none())
                .copied()
                .collect::<Vec<_>>();

            if !missing.is_empty() {
                return Err(RiskError::EncoderSchemaMismatch(format!(
                    "{} encoder lacks {}",
                    field.name(),
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<i64, RiskError> {
        self.table(field)
            .and_then(|table| table.encode(label))
            .ok_or_else(|| RiskError::UnknownCategory {
                field: field.name().to_string(),
                label: label.to_string(),
            })
    }

    pub fn decode(&self, field: CategoricalField, code: i64) -> Option<&str> {
        self.table(field).and_then(|table| table.decode(code))
    }

    pub fn table(&self, field: CategoricalField) -> Option<&LabelTable> {
        self.tables.get(&field)
    }
}
