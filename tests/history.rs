mod tests {
    use sonar_light_composer::color::Rgb;
    use sonar_light_composer::history::{HistoryBuffer, entry_from_channels};

    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    fn entry(n: u8) -> Rgb {
        Rgb::new(n, 255 - n, n / 2)
    }

    #[test]
    fn test_keeps_newest_entries() {
        let mut history = HistoryBuffer::<30>::new();
        for n in 1..=35 {
            history.push(entry(n));
        }

        assert_eq!(history.len(), 30);
        let expected: Vec<Rgb> = (6..=35).rev().map(entry).collect();
        assert_eq!(history.entries(), expected.as_slice());
        assert!(!history.entries().contains(&entry(5)));
    }

    #[test]
    fn test_push_inserts_at_head() {
        let mut history = HistoryBuffer::<4>::new();
        history.push(entry(1));
        history.push(entry(2));

        assert_eq!(history.newest(), Some(entry(2)));
        assert_eq!(history.entries(), &[entry(2), entry(1)]);
        assert_eq!(history.frame(), &[entry(2), entry(1), BLACK, BLACK]);
    }

    #[test]
    fn test_render_streams_full_frame_newest_first() {
        let mut history = HistoryBuffer::<3>::new();
        history.push(entry(1));
        history.push(entry(2));

        let mut streamed = Vec::new();
        history.render(|pixel| streamed.push(pixel));

        assert_eq!(streamed, vec![entry(2), entry(1), BLACK]);
    }

    #[test]
    fn test_empty_buffer() {
        let history = HistoryBuffer::<5>::default();
        assert!(history.is_empty());
        assert_eq!(history.newest(), None);
        assert_eq!(history.capacity(), 5);
        assert_eq!(history.frame(), &[BLACK; 5]);
    }

    #[test]
    fn test_entry_channel_order() {
        assert_eq!(entry_from_channels([10, 20, 30]), Rgb::new(10, 20, 30));
    }
}
