use crate::*;
use num_bigint::BigUint;
use rayon::prelude::*;
use std::collections::HashMap;

/// Every length-`len` vector of non-negative counts summing to at most `total`, in
/// lexicographic order.
///
/// The sequence is lazy and finite. Clone it (or build a new one) to start over.
#[derive(Clone, Debug)]
pub struct CountVectors {
    next: Option<Vec<u64>>,
    total: u64,
}

impl CountVectors {
    pub fn new(len: usize, total: u64) -> Self {
        CountVectors {
            next: Some(vec![0; len]),
            total,
        }
    }

    fn advance(&self, current: &[u64]) -> Option<Vec<u64>> {
        let last = current.len().checked_sub(1)?;
        let mut next = current.to_vec();
        let sum: u64 = current.iter().sum();
        if sum < self.total {
            next[last] += 1;
            return Some(next);
        }

        // Sum is saturated: carry into the position left of the rightmost non-zero count
        let j = current.iter().rposition(|&count| count > 0)?;
        if j == 0 {
            return None;
        }
        next[j] = 0;
        next[j - 1] += 1;
        Some(next)
    }
}

impl Iterator for CountVectors {
    type Item = Vec<u64>;

    fn next(&mut self) -> Option<Vec<u64>> {
        let current = self.next.take()?;
        self.next = self.advance(&current);
        Some(current)
    }
}

/// Σ counts[i]·points[i]
fn combine(
    curve: &EllipticCurve,
    points: &[CurvePoint],
    counts: &[u64],
) -> Result<CurvePoint, CurveError> {
    let mut sum = CurvePoint::identity();
    for (point, &count) in points.iter().zip(counts) {
        if count > 0 {
            let term = curve.multiply(&BigUint::from(count), point)?;
            sum = curve.add(&sum, &term)?;
        }
    }
    Ok(sum)
}

/// Find the per-candidate counts c (summing to exactly `ballots`) with
/// Σ c_i·M_i = `target`, by meet-in-the-middle over the two halves of the candidates.
///
/// Left half vectors are bucketed by their partial sum and keyed by point. When two left
/// vectors map to the same point in one bucket the later one is kept.
pub fn recover_counts(
    curve: &EllipticCurve,
    target: &CurvePoint,
    base_points: &[CurvePoint],
    ballots: u64,
) -> Result<Vec<u64>, Error> {
    let split = base_points.len() / 2;
    let (left_points, right_points) = base_points.split_at(split);

    let left: Vec<Vec<u64>> = CountVectors::new(left_points.len(), ballots).collect();
    let right: Vec<Vec<u64>> = CountVectors::new(right_points.len(), ballots).collect();
    debug!(
        "recovering counts for {} ballots: {} left vectors, {} right vectors",
        ballots,
        left.len(),
        right.len()
    );

    let evaluated = left
        .into_par_iter()
        .map(|counts| {
            let point = combine(curve, left_points, &counts)?;
            Ok((counts.iter().sum::<u64>(), point, counts))
        })
        .collect::<Result<Vec<_>, CurveError>>()?;

    let mut buckets: Vec<HashMap<CurvePoint, Vec<u64>>> = vec![HashMap::new(); ballots as usize + 1];
    for (sum, point, counts) in evaluated {
        buckets[sum as usize].insert(point, counts);
    }

    let found = right.par_iter().find_map_first(|counts| {
        let sum: u64 = counts.iter().sum();
        let probe = combine(curve, right_points, counts).and_then(|point| curve.subtract(target, &point));
        match probe {
            Ok(probe) => buckets[(ballots - sum) as usize].get(&probe).map(|left| {
                let mut result = left.clone();
                result.extend_from_slice(counts);
                Ok(result)
            }),
            Err(e) => Some(Err(e)),
        }
    });

    match found {
        Some(Ok(counts)) => Ok(counts),
        Some(Err(e)) => Err(e.into()),
        None => {
            warn!("no count vector for {} ballots matches the decrypted aggregate", ballots);
            Err(Error::Tally)
        }
    }
}
