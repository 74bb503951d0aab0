use std::collections::{BTreeMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::ClassifyError;
use crate::model::RoleFlag;

// ---------- builtin rule tables ----------

const PROFESSOR_KEYWORDS: &[&str] = &["professor", "faculty"];
const INSTRUCTOR_KEYWORDS: &[&str] = &["instructor", "educator", "adjunct", "lecturer", "teacher"];
// The misspelled variants appear in upstream source data; keep them.
const EMERITUS_KEYWORDS: &[&str] = &["emeritus", "emerita", "emiritus", "emirita"];
const ASSISTANT_KEYWORDS: &[&str] = &["assistant"];
const ASSOCIATE_KEYWORDS: &[&str] = &["associate"];
const FULL_KEYWORDS: &[&str] = &["full"];
const CLINICAL_KEYWORDS: &[&str] = &["clinical"];
const RESEARCHER_KEYWORDS: &[&str] = &["research", "citations", "examine", "investigate"];
const RETIRED_KEYWORDS: &[&str] = &[
    "emiritus",
    "emerita",
    "retired",
    "passed away",
    "memorial",
    "obituary",
    "death",
    "tribute",
    "funeral",
    "condolences",
];

/// Direct departmental phrasing. Order is priority order.
const PRIMARY_PATTERNS: &[&str] = &[
    r"professor in the (?:dept|department) of(?: the| public)? ([A-Za-z]+)",
    r"(?:of|in)(?: the| public)? ([A-Za-z]+) (?:dept|department)",
    r"(?:in the )?(?:dept|department)(?:s|.)? of(?: the|.| public)? ([A-Za-z]+)",
    r"the ([A-Za-z]+) department",
    r"professor (?:of|in)(?: the)? ([A-Za-z]+)",
    r"chair in(?: the)? ([A-Za-z]+)",
    r"professor emerit(?:us|a) of(?: the| public)? ([A-Za-z]+)",
    r"faculty of(?: the)? ([A-Za-z]+)",
    r"(?:of|in) the ([A-Za-z]+) [A-Za-z]+ (?:dept|department)",
];

/// Indirect phrasing (research areas, schools, degrees). Consulted only
/// when no primary pattern fires anywhere.
const BACKUP_PATTERNS: &[&str] = &[
    r"(?:a|an) ([A-Za-z]+) professor",
    r"book on(?: the)? ([A-Za-z]+)",
    r"in the area of(?: the)? ([A-Za-z]+)",
    r"research(?: primarily)? focused on(?: the)? ([A-Za-z]+)",
    r"(?:area of|research|areas of|) interest(?:s)(?::|.) ([A-Za-z]+)",
    r"research focus(?:es)? on(?: the)? ([A-Za-z]+)",
    r"research interest(?:s)?: ([A-Za-z]+)",
    r"expert in(?: the)? ([A-Za-z]+)",
    r"leader in(?: the)? ([A-Za-z]+)",
    r"(?:school|college) of(?: the| public)? ([A-Za-z]+)",
    r"center for(?: the)? ([A-Za-z]+)",
    r"ph\.?d\.?\s*(?:degree\s+)?(?:in|of|from)?\s*([A-Za-z]+)",
    r"is (?:a|an) ([A-Za-z]+) professor",
    r"professor, ([A-Za-z]+)",
];

/// Generic captures that never name a department.
const IGNORE_TERMS: &[&str] = &[
    "the",
    "department",
    "assistant",
    "associate",
    "full",
    "special",
    "university",
    "adjunct",
    "school",
    "senior",
    "college",
    "emeritus",
    "degree",
    "current",
    "phone",
    "faculty",
    "dept",
    "in",
    "research",
    "professor",
    "specialty",
];

/// Counts teaching mentions. `\w*` covers teaches/teaching/teacher;
/// the irregular past needs its own branch.
const TEACHING_MARKER: &str = r"\bteach\w*|\btaught\b";

// ---------- rules file (TOML) ----------

#[derive(Debug, Deserialize)]
struct RulesFile {
    patterns: PatternsSection,
    role_keywords: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PatternsSection {
    primary: Vec<String>,
    backup: Vec<String>,
    #[serde(default)]
    ignore: Vec<String>,
}

// ---------- RuleSet ----------

/// Immutable classification rule tables: role keyword sets, the two regex
/// tiers, the capture ignore list, and the teaching marker. Built once and
/// passed by reference into the engine.
#[derive(Debug)]
pub struct RuleSet {
    role_keywords: Vec<(RoleFlag, Vec<String>)>,
    primary: Vec<Regex>,
    backup: Vec<Regex>,
    ignore: HashSet<String>,
    teaching_marker: Regex,
}

impl RuleSet {
    /// The curated default tables.
    pub fn builtin() -> RuleSet {
        Self::compile(builtin_file()).expect("builtin rules compile")
    }

    /// Parse and validate a rules file. Any invalid pattern, empty tier,
    /// empty keyword list, or unknown/missing flag name is fatal.
    pub fn from_toml(data: &str) -> Result<RuleSet, ClassifyError> {
        let file: RulesFile =
            toml::from_str(data).map_err(|e| ClassifyError::ConfigParse(e.to_string()))?;
        Self::compile(file)
    }

    fn compile(mut file: RulesFile) -> Result<RuleSet, ClassifyError> {
        let mut role_keywords = Vec::with_capacity(RoleFlag::ALL.len());
        for flag in RoleFlag::ALL {
            let keywords = file.role_keywords.remove(flag.column_name()).ok_or_else(|| {
                ClassifyError::ConfigValidation(format!(
                    "missing keyword list for flag '{flag}'"
                ))
            })?;
            if keywords.is_empty() {
                return Err(ClassifyError::ConfigValidation(format!(
                    "empty keyword list for flag '{flag}'"
                )));
            }
            let keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
            role_keywords.push((flag, keywords));
        }
        if let Some(unknown) = file.role_keywords.keys().next() {
            return Err(ClassifyError::ConfigValidation(format!(
                "unknown flag '{unknown}' in role_keywords"
            )));
        }

        if file.patterns.primary.is_empty() {
            return Err(ClassifyError::ConfigValidation(
                "primary pattern tier is empty".into(),
            ));
        }
        if file.patterns.backup.is_empty() {
            return Err(ClassifyError::ConfigValidation(
                "backup pattern tier is empty".into(),
            ));
        }

        let primary = compile_tier(&file.patterns.primary)?;
        let backup = compile_tier(&file.patterns.backup)?;

        let ignore = file
            .patterns
            .ignore
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let teaching_marker = RegexBuilder::new(TEACHING_MARKER)
            .case_insensitive(true)
            .build()
            .map_err(|e| ClassifyError::PatternCompile {
                pattern: TEACHING_MARKER.into(),
                message: e.to_string(),
            })?;

        Ok(RuleSet {
            role_keywords,
            primary,
            backup,
            ignore,
            teaching_marker,
        })
    }

    pub fn role_keywords(&self) -> &[(RoleFlag, Vec<String>)] {
        &self.role_keywords
    }

    pub fn primary(&self) -> &[Regex] {
        &self.primary
    }

    pub fn backup(&self) -> &[Regex] {
        &self.backup
    }

    /// True if a lowercased capture is too generic to count as a department.
    pub fn is_ignored(&self, term: &str) -> bool {
        self.ignore.contains(term)
    }

    pub fn teaching_marker(&self) -> &Regex {
        &self.teaching_marker
    }
}

fn compile_tier(patterns: &[String]) -> Result<Vec<Regex>, ClassifyError> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ClassifyError::PatternCompile {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        // captures_len counts the implicit whole-match group 0.
        let groups = re.captures_len() - 1;
        if groups != 1 {
            return Err(ClassifyError::PatternCaptures {
                pattern: pattern.clone(),
                groups,
            });
        }
        compiled.push(re);
    }
    Ok(compiled)
}

fn builtin_file() -> RulesFile {
    let keyword_sets: [(&str, &[&str]); 9] = [
        ("isProfessor", PROFESSOR_KEYWORDS),
        ("isInstructor", INSTRUCTOR_KEYWORDS),
        ("isEmeritus", EMERITUS_KEYWORDS),
        ("isAssistantProf", ASSISTANT_KEYWORDS),
        ("isAssociateProf", ASSOCIATE_KEYWORDS),
        ("isFullProf", FULL_KEYWORDS),
        ("isClinicalProf", CLINICAL_KEYWORDS),
        ("isResearcher", RESEARCHER_KEYWORDS),
        ("isRetired", RETIRED_KEYWORDS),
    ];
    RulesFile {
        patterns: PatternsSection {
            primary: PRIMARY_PATTERNS.iter().map(|s| s.to_string()).collect(),
            backup: BACKUP_PATTERNS.iter().map(|s| s.to_string()).collect(),
            ignore: IGNORE_TERMS.iter().map(|s| s.to_string()).collect(),
        },
        role_keywords: keyword_sets
            .iter()
            .map(|(name, words)| {
                (
                    name.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect(),
    }
}
