use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::Record;

/// Where the generator draws its stimulus from. Injected so runs can be replayed.
pub trait StimulusSource: Send {
    fn next_stimulus(&mut self) -> Record;
}

/// Uniform, independent draws of `d` and `reset`.
#[derive(Debug)]
pub struct RandomStimulus<R = StdRng> {
    rng: R,
}

impl<R: Rng + Send> RandomStimulus<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomStimulus<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> StimulusSource for RandomStimulus<R> {
    fn next_stimulus(&mut self) -> Record {
        let d = self.rng.gen::<bool>() as u8;
        let reset = self.rng.gen::<bool>() as u8;
        Record::stimulus(d, reset)
    }
}

/// Fixed `(d, reset)` script, replayed from the start once exhausted.
#[derive(Clone, Debug)]
pub struct Scripted {
    script: Vec<(u8, u8)>,
    pos: usize,
}

impl Scripted {
    pub fn new(script: Vec<(u8, u8)>) -> Self {
        Self { script, pos: 0 }
    }

    /// `d` values with reset held low.
    pub fn data(d: &[u8]) -> Self {
        Self::new(d.iter().map(|&d| (d, 0)).collect())
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl StimulusSource for Scripted {
    fn next_stimulus(&mut self) -> Record {
        let Some(&(d, reset)) = self.script.get(self.pos) else {
            return Record::default();
        };
        self.pos = (self.pos + 1) % self.script.len();
        Record::stimulus(d, reset)
    }
}

impl<S: StimulusSource + ?Sized> StimulusSource for Box<S> {
    fn next_stimulus(&mut self) -> Record {
        (**self).next_stimulus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_runs_repeat() {
        let mut a = RandomStimulus::seeded(7);
        let mut b = RandomStimulus::seeded(7);
        let xs: Vec<Record> = (0..32).map(|_| a.next_stimulus()).collect();
        let ys: Vec<Record> = (0..32).map(|_| b.next_stimulus()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|r| r.d <= 1 && r.reset <= 1 && r.q == 0));
    }

    #[test]
    fn random_bits_cover_both_values() {
        let mut src = RandomStimulus::seeded(1);
        let draws: Vec<Record> = (0..256).map(|_| src.next_stimulus()).collect();
        let ones = draws.iter().filter(|r| r.d == 1).count();
        let resets = draws.iter().filter(|r| r.reset == 1).count();
        assert!((64..192).contains(&ones), "d=1 drawn {} times", ones);
        assert!((64..192).contains(&resets), "reset=1 drawn {} times", resets);
    }

    #[test]
    fn script_wraps_around() {
        let mut src = Scripted::new(vec![(1, 0), (0, 1)]);
        let got: Vec<(u8, u8)> = (0..3)
            .map(|_| src.next_stimulus())
            .map(|r| (r.d, r.reset))
            .collect();
        assert_eq!(got, vec![(1, 0), (0, 1), (1, 0)]);
        assert_eq!(Scripted::data(&[1, 1]).len(), 2);
    }
}
