//! Property-based invariant tests for reel construction and placeholders.
//!
//! 1. One slot per grapheme cluster of literal content.
//! 2. The placeholder has the content's shape with every digit zeroed.
//! 3. Every numeric slot carries the same canonical reel, whatever its digit.
//! 4. Every slot's target is a member of its reel.
//! 5. Reels never contain duplicates.

use std::collections::HashSet;

use odometer::config::NUMERIC_EXTRAS;
use odometer::reel::{PLACEHOLDER_GLYPH, placeholder};
use odometer::{ContentNode, ReelBuilder};
use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

fn content_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9a-zA-Z$,.%kM \\-]{0,24}").expect("valid regex")
}

fn builder() -> ReelBuilder {
    ReelBuilder::new(NUMERIC_EXTRAS, &[])
}

proptest! {
    #[test]
    fn one_slot_per_grapheme(text in content_strategy()) {
        let slots = builder().build(&[ContentNode::from(text.as_str())]);
        prop_assert_eq!(slots.len(), text.graphemes(true).count());
    }

    #[test]
    fn placeholder_zeroes_digits(text in content_strategy()) {
        let shown: String = placeholder(&[ContentNode::from(text.as_str())])
            .iter()
            .map(|g| g.as_str())
            .collect();
        let expected: String = text
            .chars()
            .map(|c| if c.is_ascii_digit() { PLACEHOLDER_GLYPH.to_owned() } else { c.to_string() })
            .collect();
        prop_assert_eq!(shown, expected);
    }

    #[test]
    fn numeric_reel_is_canonical(text in content_strategy()) {
        let builder = builder();
        let canonical: Vec<&str> = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]
            .into_iter()
            .chain(NUMERIC_EXTRAS.iter().copied())
            .collect();
        let slots = builder.build(&[ContentNode::from(text.as_str())]);
        for slot in slots.iter().filter(|s| s.target.is_numeric()) {
            let glyphs: Vec<&str> = slot.reel.iter().map(|g| g.as_str()).collect();
            prop_assert_eq!(&glyphs, &canonical);
        }
    }

    #[test]
    fn targets_are_reel_members(text in content_strategy()) {
        for slot in builder().build(&[ContentNode::from(text.as_str())]) {
            prop_assert!(slot.target_index().is_some(), "{:?} missing", slot.target);
        }
    }

    #[test]
    fn reels_have_no_duplicates(
        text in content_strategy(),
        extras in prop::collection::vec("[0-9kM%]", 0..6),
    ) {
        let builder = ReelBuilder::new(NUMERIC_EXTRAS, &extras.iter().map(String::as_str).collect::<Vec<_>>());
        for slot in builder.build(&[ContentNode::from(text.as_str())]) {
            let unique: HashSet<&str> = slot.reel.iter().map(|g| g.as_str()).collect();
            prop_assert_eq!(unique.len(), slot.reel.len());
        }
    }
}
