#![no_main]

use deckgen_core::Palette;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let palette = Palette::default();
        let deck = deckgen_read_json::normalize_or_placeholder(s, &palette).into_deck();

        // Always a usable deck, indexed by position
        assert!(!deck.slides.is_empty());
        for (pos, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.index, pos + 1);
            assert!(!slide.title.is_empty());
        }
    }
});
