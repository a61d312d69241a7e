//! Lookup of the bending angles adjacent to a dihedral.

/// Index of `triple` in `angles`, matching the given order first and then the
/// reversed order (first and third swapped, middle fixed).
pub fn find_angle<T: AsRef<[usize]>>(triple: [usize; 3], angles: &[T]) -> Option<usize> {
    let reversed = [triple[2], triple[1], triple[0]];
    [triple, reversed].iter().find_map(|wanted| {
        angles
            .iter()
            .position(|beads| beads.as_ref() == wanted.as_slice())
    })
}

/// Indices of angles `(a,b,c)` and `(b,c,d)` for dihedral `(a,b,c,d)`.
///
/// `None` unless both are present.
pub fn adjacent_angles<T: AsRef<[usize]>>(dihedral: &[usize], angles: &[T]) -> Option<(usize, usize)> {
    let [a, b, c, d] = <[usize; 4]>::try_from(dihedral).ok()?;
    let first = find_angle([a, b, c], angles)?;
    let second = find_angle([b, c, d], angles)?;
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_triple_is_found() {
        let angles = [vec![1, 2, 3], vec![4, 5, 6]];
        assert_eq!(find_angle([3, 2, 1], &angles), Some(0));
        assert_eq!(find_angle([4, 5, 6], &angles), Some(1));
    }

    #[test]
    fn absent_triple_is_none() {
        let angles = [vec![1, 2, 3], vec![4, 5, 6]];
        assert_eq!(find_angle([9, 9, 9], &angles), None);
        // The middle bead must match.
        assert_eq!(find_angle([1, 3, 2], &angles), None);
    }

    #[test]
    fn given_order_wins_over_reversed() {
        let angles = [vec![3, 2, 1], vec![1, 2, 3]];
        assert_eq!(find_angle([1, 2, 3], &angles), Some(1));
    }

    #[test]
    fn dihedral_needs_both_adjacent_angles() {
        let angles = [vec![0, 1, 2], vec![3, 2, 1]];
        assert_eq!(adjacent_angles(&[0, 1, 2, 3], &angles), Some((0, 1)));
        assert_eq!(adjacent_angles(&[0, 1, 2, 4], &angles), None);
        assert_eq!(adjacent_angles(&[0, 1, 2], &angles), None);
    }
}
