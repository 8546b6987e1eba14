#[cfg(test)]
mod tests {
    use crate::algorithms::slots::{entries_for, Slot, SlotMatch, SlotMatcher, DEFAULT_ENTRY_LIMIT};
    use crate::models::{BuildingId, Confidence, PredictionEntry, PredictionTable};
    use std::collections::HashSet;

    fn matcher() -> SlotMatcher {
        SlotMatcher::with_defaults().unwrap()
    }

    fn slot_of(query: &str, hour: Option<u32>) -> Option<Slot> {
        matcher().match_slot(query, hour).map(|m| m.window().slot)
    }

    #[test]
    fn test_keyword_matches() {
        assert_eq!(slot_of("find a spot this evening", None), Some(Slot::Evening));
        assert_eq!(slot_of("Where should I eat LUNCH?", None), Some(Slot::Midday));
        assert_eq!(slot_of("somewhere to study before  class", None), Some(Slot::Morning));
        assert_eq!(slot_of("quiet place this afternoon", None), Some(Slot::Afternoon));
        assert_eq!(slot_of("open tonight?", None), Some(Slot::Evening));
    }

    #[test]
    fn test_keyword_priority() {
        assert_eq!(slot_of("lunch or tonight?", None), Some(Slot::Midday));
        assert_eq!(slot_of("this morning or tonight", None), Some(Slot::Evening));
        assert_eq!(slot_of("after class tomorrow morning", None), Some(Slot::Morning));
    }

    #[test]
    fn test_keywords_are_whole_words() {
        // "afternoon" must not be read as "noon".
        let m = matcher();
        let matched = m.match_slot("this afternoon", None).unwrap();
        assert!(matches!(matched, SlotMatch::Keyword(w) if w.slot == Slot::Afternoon));
        assert_eq!(slot_of("nightly builds", None), None);
    }

    #[test]
    fn test_hour_tokens() {
        assert_eq!(slot_of("9am", None), Some(Slot::Morning));
        assert_eq!(slot_of("around 12 PM please", None), Some(Slot::Midday));
        assert_eq!(slot_of("at 3pm", None), Some(Slot::Afternoon));
        assert_eq!(slot_of("at 7 pm", None), Some(Slot::Evening));
    }

    #[test]
    fn test_extract_hour_converts_twelve() {
        let m = matcher();
        assert_eq!(m.extract_hour("12am"), Some(0));
        assert_eq!(m.extract_hour("12pm"), Some(12));
        assert_eq!(m.extract_hour("1 am"), Some(1));
        assert_eq!(m.extract_hour("11pm"), Some(23));
        assert_eq!(m.extract_hour("13pm"), None);
        assert_eq!(m.extract_hour("room 9"), None);
    }

    #[test]
    fn test_hours_outside_slots_do_not_match() {
        assert_eq!(slot_of("12am", None), None);
        assert_eq!(slot_of("11pm", None), None);
        assert_eq!(slot_of("anything", Some(5)), None);
        assert_eq!(slot_of("anything", Some(30)), None);
    }

    #[test]
    fn test_explicit_hour_wins_over_text() {
        let m = matcher();
        let matched = m.match_slot("around 9am", Some(15)).unwrap();
        assert_eq!(matched.window().slot, Slot::Afternoon);
        assert!(matches!(matched, SlotMatch::Hour { hour: 15, .. }));
    }

    #[test]
    fn test_keyword_wins_over_hour() {
        assert_eq!(slot_of("lunch at 9am", None), Some(Slot::Midday));
    }

    #[test]
    fn test_forward_looking_falls_back_to_first_slot() {
        let m = matcher();
        let matched = m.match_slot("what is the best time to go?", None).unwrap();
        assert!(matched.is_fallback());
        assert_eq!(matched.window().slot, Slot::Morning);
    }

    #[test]
    fn test_unrelated_query_has_no_slot() {
        assert_eq!(slot_of("blue elephant", None), None);
        assert_eq!(slot_of("", None), None);
    }

    fn entry(building: &str) -> PredictionEntry {
        PredictionEntry {
            building_id: BuildingId::from(building),
            predicted_occupancy: 30.0,
            confidence: Confidence::High,
            best_time: String::new(),
            note: None,
            walk_time_minutes: None,
        }
    }

    fn table() -> PredictionTable {
        let mut table = PredictionTable::new();
        table.insert(
            "Evening (6–11 PM)".to_string(),
            vec![
                entry("koerner"),
                entry("old_gym"),
                entry("nest"),
                entry("ikb"),
                entry("life"),
                entry("sauder"),
            ],
        );
        table
    }

    #[test]
    fn test_entries_drop_unknown_and_keep_order() {
        let known: HashSet<&str> = ["ikb", "nest", "koerner", "life", "sauder"].into_iter().collect();
        let table = table();
        let entries = entries_for("Evening (6–11 PM)", &table, &known, DEFAULT_ENTRY_LIMIT);
        let ids: Vec<&str> = entries.iter().map(|e| e.building_id.as_str()).collect();
        assert_eq!(ids, vec!["koerner", "nest", "ikb", "life"]);
    }

    #[test]
    fn test_entries_for_missing_slot_is_empty() {
        let known: HashSet<&str> = ["ikb"].into_iter().collect();
        let table = table();
        assert!(entries_for("Morning (7–11 AM)", &table, &known, 4).is_empty());
        assert!(entries_for("Evening (6–11 PM)", &table, &HashSet::new(), 4).is_empty());
    }
}
