// Generation Task Model
// Contiguous split of one payload request across a fixed worker width

/// Alphabet drawn from by the default segment source
pub const PAYLOAD_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Smallest payload a producer asks for
pub const MIN_PAYLOAD_LEN: usize = 2_000_000;

/// Largest payload a producer asks for
pub const MAX_PAYLOAD_LEN: usize = 20_000_000;

/// One contiguous sub-range of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTask {
    /// Position in submission order
    pub index: usize,
    /// Offset of the first character in the final payload
    pub offset: usize,
    /// Number of characters this task produces
    pub len: usize,
}

/// Split `total` characters into `width` contiguous tasks.
///
/// The first `total % width` tasks get one extra character, so the lengths
/// sum to `total` with no gaps or overlaps. `width` must be non-zero.
pub fn plan_segments(total: usize, width: usize) -> Vec<GenerationTask> {
    debug_assert!(width > 0, "plan_segments requires a non-zero width");
    let base = total / width;
    let remainder = total % width;

    let mut offset = 0;
    (0..width)
        .map(|index| {
            let len = base + usize::from(index < remainder);
            let task = GenerationTask { index, offset, len };
            offset += len;
            task
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_even_split() {
        let tasks = plan_segments(2_000_000, 8);
        assert_eq!(tasks.len(), 8);
        assert!(tasks.iter().all(|t| t.len == 250_000));
        assert_eq!(tasks[7].offset, 1_750_000);
    }

    #[test]
    fn test_plan_remainder_goes_to_first_tasks() {
        let tasks = plan_segments(20_000_003, 8);
        let lens: Vec<usize> = tasks.iter().map(|t| t.len).collect();
        assert_eq!(
            lens,
            vec![2_500_001, 2_500_001, 2_500_001, 2_500_000, 2_500_000, 2_500_000, 2_500_000, 2_500_000]
        );
    }

    #[test]
    fn test_plan_is_contiguous() {
        for total in [0, 1, 7, 8, 9, 3_333_333] {
            let tasks = plan_segments(total, 8);
            let mut expected_offset = 0;
            for (i, task) in tasks.iter().enumerate() {
                assert_eq!(task.index, i);
                assert_eq!(task.offset, expected_offset);
                expected_offset += task.len;
            }
            assert_eq!(expected_offset, total);
        }
    }

    #[test]
    fn test_plan_smaller_than_width() {
        let tasks = plan_segments(3, 8);
        let lens: Vec<usize> = tasks.iter().map(|t| t.len).collect();
        assert_eq!(lens, vec![1, 1, 1, 0, 0, 0, 0, 0]);
    }
}
