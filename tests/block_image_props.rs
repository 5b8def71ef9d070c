//! Property tests for block image encoding.

use blockpool::{BlockImage, Error};
use proptest::prelude::*;

const CAPACITY: usize = 400;

proptest! {
    #[test]
    fn int_round_trips(offset in 0usize..=CAPACITY - 4, value: i32) {
        let mut image = BlockImage::new(CAPACITY);
        image.write_int(offset, value).unwrap();
        prop_assert_eq!(image.read_int(offset).unwrap(), value);
    }

    #[test]
    fn bytes_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..200), offset in 0usize..196) {
        let mut image = BlockImage::new(CAPACITY);
        image.write_bytes(offset, &bytes).unwrap();
        prop_assert_eq!(image.read_bytes(offset).unwrap(), bytes);
    }

    #[test]
    fn text_round_trips(text in "[^\\x00]{0,60}") {
        let mut image = BlockImage::new(CAPACITY);
        image.write_text(10, &text).unwrap();
        prop_assert_eq!(image.read_text(10).unwrap(), text);
    }

    #[test]
    fn max_length_is_tight(text in "[a-zA-Z0-9 ]{0,100}") {
        let needed = BlockImage::max_length(text.encode_utf16().count());

        let mut exact = BlockImage::new(needed);
        prop_assert!(exact.write_text(0, &text).is_ok());

        let mut short = BlockImage::new(needed - 1);
        let rejected = matches!(short.write_text(0, &text), Err(Error::BlockOverflow { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn overflowing_writes_change_nothing(
        seed in proptest::collection::vec(any::<u8>(), CAPACITY),
        back in 1usize..4,
        value: i32,
        text in "[a-z]{1,10}",
    ) {
        let mut image = BlockImage::new(CAPACITY);
        image.as_mut_slice().copy_from_slice(&seed);

        prop_assert!(image.write_int(CAPACITY - back, value).is_err());
        prop_assert!(image.write_bytes(CAPACITY - back, &[1, 2]).is_err());
        prop_assert!(image.write_text(CAPACITY - back, &text).is_err());
        prop_assert_eq!(image.as_slice(), seed.as_slice());
    }
}
