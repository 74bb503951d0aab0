use std::fmt;

use serde::Serialize;

/// Sentinel written in place of an absent department signal.
/// Lives only at the persisted-column boundary; in-memory signals are `Option`.
pub const MISSING: &str = "MISSING";

/// Column names of the derived signals, in persisted order.
/// Consumers depend on these exact names.
pub const DERIVED_COLUMNS: [&str; 14] = [
    "isProfessor",
    "isInstructor",
    "isEmeritus",
    "isAssistantProf",
    "isAssociateProf",
    "isFullProf",
    "isClinicalProf",
    "isResearcher",
    "isRetired",
    "teaching_intensity",
    "department_textual",
    "isPrimaryPattern",
    "department_keyword",
    "keyword_precision",
];

/// The nine role predicates, in persisted column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoleFlag {
    Professor,
    Instructor,
    Emeritus,
    AssistantProf,
    AssociateProf,
    FullProf,
    ClinicalProf,
    Researcher,
    Retired,
}

impl RoleFlag {
    pub const ALL: [RoleFlag; 9] = [
        RoleFlag::Professor,
        RoleFlag::Instructor,
        RoleFlag::Emeritus,
        RoleFlag::AssistantProf,
        RoleFlag::AssociateProf,
        RoleFlag::FullProf,
        RoleFlag::ClinicalProf,
        RoleFlag::Researcher,
        RoleFlag::Retired,
    ];

    /// Persisted column name for this flag.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Professor => "isProfessor",
            Self::Instructor => "isInstructor",
            Self::Emeritus => "isEmeritus",
            Self::AssistantProf => "isAssistantProf",
            Self::AssociateProf => "isAssociateProf",
            Self::FullProf => "isFullProf",
            Self::ClinicalProf => "isClinicalProf",
            Self::Researcher => "isResearcher",
            Self::Retired => "isRetired",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for RoleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Independent, non-exclusive role booleans. A record can be both
/// emeritus and researcher; no flag implies or excludes another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub professor: bool,
    pub instructor: bool,
    pub emeritus: bool,
    pub assistant_prof: bool,
    pub associate_prof: bool,
    pub full_prof: bool,
    pub clinical_prof: bool,
    pub researcher: bool,
    pub retired: bool,
}

impl RoleFlags {
    pub fn get(&self, flag: RoleFlag) -> bool {
        match flag {
            RoleFlag::Professor => self.professor,
            RoleFlag::Instructor => self.instructor,
            RoleFlag::Emeritus => self.emeritus,
            RoleFlag::AssistantProf => self.assistant_prof,
            RoleFlag::AssociateProf => self.associate_prof,
            RoleFlag::FullProf => self.full_prof,
            RoleFlag::ClinicalProf => self.clinical_prof,
            RoleFlag::Researcher => self.researcher,
            RoleFlag::Retired => self.retired,
        }
    }

    pub fn set(&mut self, flag: RoleFlag, value: bool) {
        match flag {
            RoleFlag::Professor => self.professor = value,
            RoleFlag::Instructor => self.instructor = value,
            RoleFlag::Emeritus => self.emeritus = value,
            RoleFlag::AssistantProf => self.assistant_prof = value,
            RoleFlag::AssociateProf => self.associate_prof = value,
            RoleFlag::FullProf => self.full_prof = value,
            RoleFlag::ClinicalProf => self.clinical_prof = value,
            RoleFlag::Researcher => self.researcher = value,
            RoleFlag::Retired => self.retired = value,
        }
    }

    /// True if any flag is set.
    pub fn any(&self) -> bool {
        RoleFlag::ALL.iter().any(|f| self.get(*f))
    }
}

/// Which regex tier produced a textual department match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternTier {
    Primary,
    Backup,
}

impl PatternTier {
    /// Persisted encoding of the tier: 1 = primary, 0 = backup.
    pub fn persisted(&self) -> i8 {
        match self {
            Self::Primary => 1,
            Self::Backup => 0,
        }
    }
}

impl fmt::Display for PatternTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup => f.write_str("backup"),
        }
    }
}

/// Department name captured by a regex pattern, plus the tier that won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextualMatch {
    pub name: String,
    pub tier: PatternTier,
}

/// Department name hit in the precision whitelist.
/// Precision is 1..=3, lower is more precise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub name: String,
    pub precision: u8,
}

/// Full classification of one record's snippets.
///
/// The two department signals come from independent extraction paths and are
/// never reconciled against each other; downstream consumers pick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub flags: RoleFlags,
    pub teaching_intensity: u32,
    pub textual: Option<TextualMatch>,
    pub keyword: Option<KeywordMatch>,
}

impl Classification {
    /// True if anything at all was found. Records with no evidence are
    /// routed to the reprocess table instead of the completed one.
    pub fn has_evidence(&self) -> bool {
        self.flags.any()
            || self.teaching_intensity > 0
            || self.textual.is_some()
            || self.keyword.is_some()
    }

    /// Values for the persisted derived columns, in [`DERIVED_COLUMNS`] order.
    /// Absent signals encode as `MISSING` with a `-1` companion value.
    pub fn column_values(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(DERIVED_COLUMNS.len());
        for flag in RoleFlag::ALL {
            out.push(if self.flags.get(flag) { "true" } else { "false" }.to_string());
        }
        out.push(self.teaching_intensity.to_string());
        match &self.textual {
            Some(m) => {
                out.push(m.name.clone());
                out.push(m.tier.persisted().to_string());
            }
            None => {
                out.push(MISSING.to_string());
                out.push("-1".to_string());
            }
        }
        match &self.keyword {
            Some(m) => {
                out.push(m.name.clone());
                out.push(m.precision.to_string());
            }
            None => {
                out.push(MISSING.to_string());
                out.push("-1".to_string());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_encoding_for_absent_signals() {
        let c = Classification::default();
        assert!(!c.has_evidence());
        let values = c.column_values();
        assert_eq!(values.len(), DERIVED_COLUMNS.len());
        assert!(values[..9].iter().all(|v| v == "false"));
        assert_eq!(values[9], "0");
        assert_eq!(values[10], MISSING);
        assert_eq!(values[11], "-1");
        assert_eq!(values[12], MISSING);
        assert_eq!(values[13], "-1");
    }

    #[test]
    fn tier_encoding() {
        let c = Classification {
            textual: Some(TextualMatch {
                name: "chemistry".into(),
                tier: PatternTier::Primary,
            }),
            keyword: Some(KeywordMatch {
                name: "economics".into(),
                precision: 1,
            }),
            ..Classification::default()
        };
        let values = c.column_values();
        assert_eq!(values[10], "chemistry");
        assert_eq!(values[11], "1");
        assert_eq!(values[12], "economics");
        assert_eq!(values[13], "1");

        let backup = Classification {
            textual: Some(TextualMatch {
                name: "history".into(),
                tier: PatternTier::Backup,
            }),
            ..Classification::default()
        };
        assert_eq!(backup.column_values()[11], "0");
    }

    #[test]
    fn flag_column_names_round_trip() {
        for flag in RoleFlag::ALL {
            assert_eq!(RoleFlag::from_column_name(flag.column_name()), Some(flag));
        }
        assert_eq!(RoleFlag::from_column_name("isWizard"), None);
    }

    #[test]
    fn column_order_matches_flag_order() {
        for (i, flag) in RoleFlag::ALL.iter().enumerate() {
            assert_eq!(DERIVED_COLUMNS[i], flag.column_name());
        }
    }
}
