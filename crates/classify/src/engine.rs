use crate::model::{Classification, KeywordMatch, PatternTier, RoleFlags, TextualMatch};
use crate::rules::RuleSet;
use crate::whitelist::DepartmentWhitelist;

/// Deterministic snippet classifier. Borrows its rule tables so one
/// `RuleSet`/whitelist pair serves a whole batch.
pub struct Classifier<'a> {
    rules: &'a RuleSet,
    whitelist: &'a DepartmentWhitelist,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a RuleSet, whitelist: &'a DepartmentWhitelist) -> Classifier<'a> {
        Classifier { rules, whitelist }
    }

    /// Classify one record's snippets. Total: absent or empty snippets
    /// yield the all-absent classification, never an error.
    pub fn classify(&self, snippets: Option<&[String]>) -> Classification {
        let snippets = match snippets {
            Some(s) if !s.is_empty() => s,
            _ => return Classification::default(),
        };

        let mut flags = RoleFlags::default();
        let mut teaching_intensity: u32 = 0;
        for text in snippets {
            teaching_intensity += self.rules.teaching_marker().find_iter(text).count() as u32;
            let lowered = text.to_lowercase();
            for (flag, keywords) in self.rules.role_keywords() {
                if !flags.get(*flag) && keywords.iter().any(|k| lowered.contains(k.as_str())) {
                    flags.set(*flag, true);
                }
            }
        }

        Classification {
            flags,
            teaching_intensity,
            textual: self.extract_textual(snippets),
            keyword: self.extract_keyword(snippets),
        }
    }

    /// Regex extraction. Pattern order outranks snippet order: a later
    /// snippet hit by an earlier pattern beats an earlier snippet hit by a
    /// later pattern. The backup tier is consulted only when no primary
    /// pattern fires in any snippet.
    fn extract_textual(&self, snippets: &[String]) -> Option<TextualMatch> {
        let tiers = [
            (PatternTier::Primary, self.rules.primary()),
            (PatternTier::Backup, self.rules.backup()),
        ];
        for (tier, patterns) in tiers {
            for pattern in patterns {
                for text in snippets {
                    let Some(caps) = pattern.captures(text) else {
                        continue;
                    };
                    let name = match caps.get(1) {
                        Some(m) => m.as_str().trim().to_lowercase(),
                        None => continue,
                    };
                    // Generic capture: treat as a non-match, keep scanning.
                    if name.is_empty() || self.rules.is_ignored(&name) {
                        continue;
                    }
                    return Some(TextualMatch { name, tier });
                }
            }
        }
        None
    }

    /// Whitelist extraction. Precision tier 1 beats 2 beats 3 regardless of
    /// where in the snippets the hit occurs; within a tier, snippet order
    /// then entry order breaks ties.
    fn extract_keyword(&self, snippets: &[String]) -> Option<KeywordMatch> {
        for precision in 1..=3u8 {
            let entries = self.whitelist.tier(precision);
            if entries.is_empty() {
                continue;
            }
            for text in snippets {
                let lowered = text.to_lowercase();
                for entry in entries {
                    if lowered.contains(entry.as_str()) {
                        return Some(KeywordMatch {
                            name: entry.clone(),
                            precision,
                        });
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitelist() -> DepartmentWhitelist {
        DepartmentWhitelist::new([
            vec!["economics".into(), "chemistry".into()],
            vec!["public health".into()],
            vec!["labor".into(), "policy".into()],
        ])
    }

    fn snippets(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn absent_snippets_yield_all_absent() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        for input in [None, Some(&[][..])] {
            let c = classifier.classify(input);
            assert_eq!(c, Classification::default());
            assert!(!c.has_evidence());
        }
    }

    #[test]
    fn flags_are_case_insensitive_substrings() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["DR. SMITH IS A CLINICAL PROFESSOR AND RESEARCHER."]);
        let c = classifier.classify(Some(&s));
        assert!(c.flags.professor);
        assert!(c.flags.clinical_prof);
        assert!(c.flags.researcher);
        assert!(!c.flags.retired);
    }

    #[test]
    fn flags_accumulate_across_snippets() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["An adjunct instructor.", "Now retired."]);
        let c = classifier.classify(Some(&s));
        assert!(c.flags.instructor);
        assert!(c.flags.retired);
        assert!(!c.flags.professor);
    }

    #[test]
    fn misspelled_emeritus_sets_both_flags() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["Professor Emiritus of the college."]);
        let c = classifier.classify(Some(&s));
        assert!(c.flags.emeritus);
        assert!(c.flags.retired);
    }

    #[test]
    fn teaching_intensity_counts_every_inflection() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["She teaches and taught and is teaching."]);
        assert_eq!(classifier.classify(Some(&s)).teaching_intensity, 3);

        let split = snippets(&["He teaches biology.", "He taught chemistry."]);
        assert_eq!(classifier.classify(Some(&split)).teaching_intensity, 2);
    }

    #[test]
    fn primary_beats_backup_across_snippets() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        // Snippet 1 only matches a backup pattern ("expert in ...");
        // snippet 2 matches a primary pattern. Primary wins.
        let s = snippets(&[
            "She is an expert in biology.",
            "She works in the chemistry department.",
        ]);
        let c = classifier.classify(Some(&s));
        let textual = c.textual.unwrap();
        assert_eq!(textual.name, "chemistry");
        assert_eq!(textual.tier, PatternTier::Primary);
    }

    #[test]
    fn pattern_order_outranks_snippet_order() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        // Snippet 1 matches primary pattern "the X department" (4th);
        // snippet 2 matches "professor in the department of X" (1st).
        // The earlier pattern wins even though it hits the later snippet.
        let s = snippets(&[
            "Funding from the history department.",
            "A professor in the department of chemistry.",
        ]);
        let c = classifier.classify(Some(&s));
        assert_eq!(c.textual.unwrap().name, "chemistry");
    }

    #[test]
    fn ignored_capture_keeps_scanning() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        // "professor of the ..." captures "research" (ignored); the scan
        // continues and the backup school-of pattern lands a real name.
        let s = snippets(&["She is a professor of research at the school of medicine."]);
        let c = classifier.classify(Some(&s));
        let textual = c.textual.unwrap();
        assert_eq!(textual.name, "medicine");
        assert_eq!(textual.tier, PatternTier::Backup);
    }

    #[test]
    fn capture_is_trimmed_and_lowercased() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["He is a Professor of Chemistry at the university."]);
        assert_eq!(classifier.classify(Some(&s)).textual.unwrap().name, "chemistry");
    }

    #[test]
    fn whitelist_tier_one_beats_tier_three() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        // "labor" (tier 3) appears in the first snippet, "economics"
        // (tier 1) in the second. Precision outranks position.
        let s = snippets(&[
            "Her work covers labor markets.",
            "She studies economics at large.",
        ]);
        let keyword = classifier.classify(Some(&s)).keyword.unwrap();
        assert_eq!(keyword.name, "economics");
        assert_eq!(keyword.precision, 1);
    }

    #[test]
    fn whitelist_within_tier_snippet_order_wins() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        let s = snippets(&["Policy questions first.", "Labor questions second."]);
        let keyword = classifier.classify(Some(&s)).keyword.unwrap();
        assert_eq!(keyword.name, "policy");
        assert_eq!(keyword.precision, 3);
    }

    #[test]
    fn signals_are_independent() {
        let rules = RuleSet::builtin();
        let wl = whitelist();
        let classifier = Classifier::new(&rules, &wl);

        // Textual extraction finds "biology" (not whitelisted); keyword
        // extraction independently finds "economics". Both survive.
        let s = snippets(&["A professor of biology with a minor in economics."]);
        let c = classifier.classify(Some(&s));
        assert_eq!(c.textual.unwrap().name, "biology");
        assert_eq!(c.keyword.unwrap().name, "economics");
    }
}
