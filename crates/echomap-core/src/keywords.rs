//! Keyword sets and the keyword relevance score.
//!
//! `score(R) = Σ_{k∈K} [k appears in R's serialized scene tags or transcript]`,
//! so each keyword counts at most once and `0 ≤ score ≤ |K|`. The score is an
//! ordering key only; a record scoring 0 is still ranked.

use serde::{Deserialize, Serialize};

use crate::context_filter::{MatchGroup, RecordField};
use crate::defaults;
use crate::models::AudioRecord;

/// An injectable list of scoring keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build a set, dropping blank entries (a blank keyword would match every record).
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list (`"方言, 茶馆,老街"`).
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn cultural() -> Self {
        Self::new(defaults::CULTURAL_KEYWORDS)
    }

    pub fn homesick() -> Self {
        Self::new(defaults::HOMESICK_KEYWORDS)
    }

    pub fn explorer() -> Self {
        Self::new(defaults::EXPLORER_KEYWORDS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// One match group per keyword over the scored fields.
    pub fn groups(&self) -> Vec<MatchGroup> {
        self.keywords
            .iter()
            .map(|k| MatchGroup::new(k.as_str(), &RecordField::SCORED))
            .collect()
    }

    /// Number of keywords found in the record's scene tags or transcript.
    pub fn score(&self, record: &AudioRecord) -> u32 {
        let mut score = 0;
        for group in self.groups() {
            if group.matches(record) {
                score += 1;
            }
        }
        score
    }
}

/// The three strategy keyword sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub cultural: KeywordSet,
    pub homesick: KeywordSet,
    pub explorer: KeywordSet,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            cultural: KeywordSet::cultural(),
            homesick: KeywordSet::homesick(),
            explorer: KeywordSet::explorer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use chrono::Utc;
    use uuid::Uuid;

    fn record() -> AudioRecord {
        AudioRecord::new(Uuid::new_v4(), GeoPoint::new(0.0, 0.0), Utc::now())
    }

    #[test]
    fn test_score_counts_each_keyword_once() {
        let set = KeywordSet::new(["茶馆", "方言"]);
        let rec = record()
            .with_scene_tags(["茶馆", "茶馆二楼"])
            .with_transcript("茶馆里有人说方言");
        assert_eq!(set.score(&rec), 2);
    }

    #[test]
    fn test_score_ignores_city_district_and_story() {
        let set = KeywordSet::new(["老街"]);
        let rec = record()
            .with_city("老街")
            .with_district("老街")
            .with_story("老街");
        assert_eq!(set.score(&rec), 0);
    }

    #[test]
    fn test_score_zero_for_bare_record() {
        assert_eq!(KeywordSet::cultural().score(&record()), 0);
    }

    #[test]
    fn test_score_bounded_by_set_size() {
        let set = KeywordSet::cultural();
        let rec = record()
            .with_scene_tags(defaults::CULTURAL_KEYWORDS.iter().copied())
            .with_transcript(defaults::CULTURAL_KEYWORDS.join(""));
        assert_eq!(set.score(&rec) as usize, set.len());
    }

    #[test]
    fn test_score_case_insensitive() {
        let set = KeywordSet::new(["Opera"]);
        let rec = record().with_transcript("an OPERA singer rehearsing");
        assert_eq!(set.score(&rec), 1);
    }

    #[test]
    fn test_blank_keywords_dropped() {
        let set = KeywordSet::new(["", "  ", "夜市"]);
        assert_eq!(set.keywords(), &["夜市".to_string()]);
        assert_eq!(set.score(&record()), 0);
    }

    #[test]
    fn test_parse_list() {
        let set = KeywordSet::parse_list("方言, 茶馆,,老街 ");
        assert_eq!(set.keywords(), &["方言", "茶馆", "老街"]);
    }

    #[test]
    fn test_default_sets() {
        let sets = KeywordSets::default();
        assert!(sets.cultural.keywords().contains(&"茶馆".to_string()));
        assert!(sets.homesick.keywords().contains(&"家乡".to_string()));
        assert!(sets.explorer.keywords().contains(&"博物馆".to_string()));
    }

    #[test]
    fn test_groups_target_scored_fields() {
        for group in KeywordSet::explorer().groups() {
            assert_eq!(group.fields(), &RecordField::SCORED);
        }
    }
}
