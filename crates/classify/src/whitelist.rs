use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ClassifyError;

/// Known department names bucketed by precision tier 1..=3.
/// Tier 1 entries are exact department names; tier 3 entries are broad
/// terms consulted only when nothing sharper hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentWhitelist {
    tiers: [Vec<String>; 3],
}

impl DepartmentWhitelist {
    /// Build from per-tier entry lists. Entries are trimmed and lowercased;
    /// blanks are dropped.
    pub fn new(tiers: [Vec<String>; 3]) -> DepartmentWhitelist {
        DepartmentWhitelist {
            tiers: tiers.map(|entries| {
                entries
                    .iter()
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            }),
        }
    }

    /// Load the JSON side file. A missing or malformed file is fatal:
    /// there is no safe default whitelist.
    pub fn load(path: &Path) -> Result<DepartmentWhitelist, ClassifyError> {
        let data = fs::read_to_string(path).map_err(|e| ClassifyError::WhitelistRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&data)
    }

    /// Parse the side-file format: `{"1": [...], "2": [...], "3": [...]}`.
    pub fn from_json(data: &str) -> Result<DepartmentWhitelist, ClassifyError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(data).map_err(|e| ClassifyError::WhitelistParse(e.to_string()))?;

        let mut tiers: [Vec<String>; 3] = Default::default();
        for (key, entries) in raw {
            let tier = match key.as_str() {
                "1" => 0,
                "2" => 1,
                "3" => 2,
                other => {
                    return Err(ClassifyError::WhitelistParse(format!(
                        "unknown precision tier '{other}' (expected \"1\", \"2\" or \"3\")"
                    )))
                }
            };
            tiers[tier] = entries;
        }
        let whitelist = Self::new(tiers);
        if whitelist.is_empty() {
            return Err(ClassifyError::WhitelistParse(
                "whitelist has no entries".into(),
            ));
        }
        Ok(whitelist)
    }

    /// Side-file serialization, tiers keyed "1".."3".
    pub fn to_json(&self) -> String {
        let map: BTreeMap<String, &Vec<String>> = self
            .tiers
            .iter()
            .enumerate()
            .map(|(i, entries)| ((i + 1).to_string(), entries))
            .collect();
        // BTreeMap of strings to string lists cannot fail to serialize.
        serde_json::to_string_pretty(&map).unwrap_or_default()
    }

    /// Build from the curated review spreadsheet: one row per candidate with
    /// `department_keyword` and `precision_level` columns. Rows whose
    /// precision is not 1, 2 or 3 are skipped (unreviewed candidates).
    pub fn from_curated_csv(data: &str) -> Result<DepartmentWhitelist, ClassifyError> {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| ClassifyError::WhitelistParse(e.to_string()))?;

        let find = |name: &str| headers.iter().position(|h| h == name);
        let keyword_col = find("department_keyword").ok_or_else(|| {
            ClassifyError::WhitelistParse("curated file is missing 'department_keyword'".into())
        })?;
        let precision_col = find("precision_level").ok_or_else(|| {
            ClassifyError::WhitelistParse("curated file is missing 'precision_level'".into())
        })?;

        let mut tiers: [Vec<String>; 3] = Default::default();
        for record in reader.records() {
            let record = record.map_err(|e| ClassifyError::WhitelistParse(e.to_string()))?;
            let keyword = record.get(keyword_col).unwrap_or("").trim();
            if keyword.is_empty() {
                continue;
            }
            let precision = record.get(precision_col).unwrap_or("").trim();
            match precision {
                "1" => tiers[0].push(keyword.to_string()),
                "2" => tiers[1].push(keyword.to_string()),
                "3" => tiers[2].push(keyword.to_string()),
                _ => {}
            }
        }
        let whitelist = Self::new(tiers);
        if whitelist.is_empty() {
            return Err(ClassifyError::WhitelistParse(
                "curated file produced no whitelist entries".into(),
            ));
        }
        Ok(whitelist)
    }

    /// Entries of one precision tier (1..=3). Out-of-range tiers are empty.
    pub fn tier(&self, precision: u8) -> &[String] {
        match precision {
            1..=3 => &self.tiers[(precision - 1) as usize],
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let wl = DepartmentWhitelist::new([
            vec!["Economics ".into(), "chemistry".into()],
            vec!["public health".into()],
            vec!["labor".into(), "".into()],
        ]);
        assert_eq!(wl.len(), 4);
        assert_eq!(wl.tier(1), ["economics", "chemistry"]);
        assert_eq!(wl.tier(3), ["labor"]);

        let parsed = DepartmentWhitelist::from_json(&wl.to_json()).unwrap();
        assert_eq!(parsed, wl);
    }

    #[test]
    fn missing_tier_key_is_empty() {
        let wl = DepartmentWhitelist::from_json(r#"{"1": ["economics"]}"#).unwrap();
        assert_eq!(wl.tier(1), ["economics"]);
        assert!(wl.tier(2).is_empty());
        assert!(wl.tier(3).is_empty());
    }

    #[test]
    fn rejects_unknown_tier_and_empty_whitelist() {
        assert!(DepartmentWhitelist::from_json(r#"{"4": ["x"]}"#).is_err());
        assert!(DepartmentWhitelist::from_json(r#"{"1": []}"#).is_err());
        assert!(DepartmentWhitelist::from_json("not json").is_err());
    }

    #[test]
    fn curated_import_buckets_by_precision() {
        let csv = "\
department_keyword,precision_level,notes
Economics,1,core
 Public Health ,2,
labor,3,broad
pending,?,unreviewed
,1,blank keyword
";
        let wl = DepartmentWhitelist::from_curated_csv(csv).unwrap();
        assert_eq!(wl.tier(1), ["economics"]);
        assert_eq!(wl.tier(2), ["public health"]);
        assert_eq!(wl.tier(3), ["labor"]);
    }

    #[test]
    fn curated_import_requires_columns() {
        assert!(DepartmentWhitelist::from_curated_csv("a,b\n1,2\n").is_err());
    }
}
