use crate::round::Round;

/// Share of classified trials answered correctly (hit or correct
/// rejection), as a percentage rounded to two decimals. Zero when nothing
/// has been classified. Recomputed in full from the round records.
pub fn accuracy<'a, I>(rounds: I) -> f64
where
    I: IntoIterator<Item = &'a Round>,
{
    let mut correct = 0usize;
    let mut total = 0usize;

    for round in rounds {
        for trial in &round.trials {
            total += 1;
            if trial.outcome.is_correct() {
                correct += 1;
            }
        }
    }

    if total == 0 {
        return 0.0;
    }
    round_to_two((correct as f64 / total as f64) * 100.0)
}

fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
