mod tests {
    use sonar_light_composer::filter::MovingAverage;

    #[test]
    fn test_converges_after_full_window() {
        let mut average = MovingAverage::<16>::new();
        let mut mean = 0.0;
        for _ in 0..16 {
            mean = average.add(191.0);
        }
        assert_eq!(mean, 191.0);
    }

    fn settle<const N: usize>(value: f32) -> f32 {
        let mut average = MovingAverage::<N>::new();
        let mut mean = 0.0;
        for _ in 0..N {
            mean = average.add(value);
        }
        mean
    }

    #[test]
    fn test_full_window_of_one_value_averages_to_it_exactly() {
        for value in [0.1, 12.7, 33.3, 191.3, 254.96875] {
            assert_eq!(settle::<10>(value), value);
            assert_eq!(settle::<16>(value), value);
        }
    }

    #[test]
    fn test_warm_up_is_biased_toward_zero() {
        let mut average = MovingAverage::<4>::new();
        assert_eq!(average.add(8.0), 2.0);
        assert_eq!(average.add(8.0), 4.0);
        assert_eq!(average.add(8.0), 6.0);
        assert_eq!(average.add(8.0), 8.0);
    }

    #[test]
    fn test_oldest_sample_falls_off() {
        let mut average = MovingAverage::<3>::new();
        average.add(3.0);
        average.add(6.0);
        assert_eq!(average.add(9.0), 6.0);
        assert_eq!(average.add(12.0), 9.0);
        assert_eq!(average.samples(), &[12.0, 9.0, 6.0]);
    }

    #[test]
    fn test_single_sample_window() {
        let mut average = MovingAverage::<1>::default();
        assert_eq!(average.add(42.5), 42.5);
        assert_eq!(average.add(7.0), 7.0);
        assert_eq!(average.window_len(), 1);
    }

    #[test]
    fn test_mean_without_adding() {
        let mut average = MovingAverage::<2>::new();
        assert_eq!(average.mean(), 0.0);
        average.add(10.0);
        assert_eq!(average.mean(), 5.0);
    }
}
