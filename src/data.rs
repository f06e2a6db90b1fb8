use crate::component::Component;
use crate::{check_variable_count, Error, Result};
use csv_core::{ReadFieldResult, ReaderBuilder};
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

/// One observed configuration of all the variables, split into bit planes.
///
/// Plane `b` holds bit `b` of every variable's value, with variable `i` at bit position `i`. A
/// state with values `[2, 1, 0]` over three states per variable is therefore stored as the two
/// planes `[0b010, 0b001]`. Projecting a state onto a [`Component`] is just a bitwise AND of every
/// plane with the component's mask.
pub type State = SmallVec<[u128; 2]>;

/// A histogram of observations of `n` categorical variables, each taking values in `0..q`.
///
/// Identical observations are stored once along with how many times they occurred. Besides the
/// real sample size, the dataset carries an "assumed" sample size that evidence calculations scale
/// the counts to, so a model can be scored as if there had been more or fewer observations.
#[derive(Clone)]
pub struct Dataset {
    n: usize,
    q: u32,
    planes: usize,
    histogram: HashMap<State, u32>,
    sample_size: u64,
    assumed: Option<u64>,
    q_powers: Vec<f64>,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.histogram
                    .iter()
                    .map(|(state, count)| (self.state_string(state), count)),
            )
            .finish()
    }
}

impl Dataset {
    /// Creates an empty dataset for `n` variables with `q` states each.
    ///
    /// ```
    /// use mincomp::Dataset;
    ///
    /// let data = Dataset::new(5, 3)?;
    /// assert_eq!(data.planes(), 2);
    /// assert!(Dataset::new(5, 1).is_err());
    /// assert!(Dataset::new(0, 2).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn new(n: usize, q: u32) -> Result<Self> {
        check_variable_count(n)?;
        if !(2..=256).contains(&q) {
            return Err(Error::StateCount(q));
        }
        let planes = (32 - (q - 1).leading_zeros()) as usize;
        let q_powers = (0..=n as i32).map(|r| f64::from(q).powi(r)).collect();
        Ok(Dataset {
            n,
            q,
            planes,
            histogram: HashMap::new(),
            sample_size: 0,
            assumed: None,
            q_powers,
        })
    }

    /// Reads a dataset from text with one observation per line.
    ///
    /// Each line starts with a string of digits giving the value of each variable in order.
    /// Characters past the first `n` are ignored. The line may end with a tab and a count, in
    /// which case the observation is added that many times.
    ///
    /// ```
    /// use mincomp::Dataset;
    ///
    /// let input = "0110\n1021\t3\n0110 extra\n";
    /// let data = Dataset::read(input.as_bytes(), 4, 3)?;
    /// assert_eq!(data.sample_size(), 5);
    /// assert_eq!(data.unique_states(), 2);
    ///
    /// let err = Dataset::read("012\n01\n".as_bytes(), 3, 3).unwrap_err();
    /// assert_eq!(err.to_string(), "line 2: expected at least 3 variables, got 2");
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn read<R: io::Read>(mut input: R, n: usize, q: u32) -> Result<Self> {
        let mut data = Dataset::new(n, q)?;
        let mut inputbuf = [0; 16384];
        let mut fieldbuf = [0; 1024];
        let mut fieldlen = 0;
        let mut values = None;
        let mut count = None;
        let mut tsv = ReaderBuilder::new().delimiter(b'\t').build();

        loop {
            let read = input.read(&mut inputbuf)?;
            let mut bytes = &inputbuf[..read];
            loop {
                let (result, nin, nout) = tsv.read_field(bytes, &mut fieldbuf[fieldlen..]);
                // The reader counts a newline as soon as it consumes one, even the one ending
                // the field it just returned.
                let line = tsv.line() - u64::from(nin > 0 && bytes[nin - 1] == b'\n');
                bytes = &bytes[nin..];
                fieldlen += nout;
                match result {
                    ReadFieldResult::InputEmpty => break,
                    ReadFieldResult::OutputFull => {
                        return Err(Error::Parse {
                            line,
                            reason: "field is too long".into(),
                        });
                    }
                    ReadFieldResult::Field { record_end } => {
                        let field = &fieldbuf[..fieldlen];
                        fieldlen = 0;

                        let parsed = if values.is_none() {
                            data.parse_values(field).map(|v| values = Some(v))
                        } else if count.is_none() {
                            parse_count(field).map(|c| count = Some(c))
                        } else {
                            Err("expected a state and an optional count".into())
                        };
                        parsed.map_err(|reason| Error::Parse { line, reason })?;

                        if record_end {
                            if let Some(values) = values.take() {
                                data.add_observation(&values, count.take().unwrap_or(1))?;
                            }
                        }
                    }
                    ReadFieldResult::End => {
                        data.shrink_to_fit();
                        return Ok(data);
                    }
                }
            }
        }
    }

    /// Reads a dataset from the file at `path`, in the same format as [`Dataset::read`].
    pub fn open<P: AsRef<Path>>(path: P, n: usize, q: u32) -> Result<Self> {
        Dataset::read(io::BufReader::new(File::open(path)?), n, q)
    }

    fn parse_values(&self, field: &[u8]) -> Result<Vec<u8>, String> {
        if field.len() < self.n {
            return Err(format!(
                "expected at least {} variables, got {}",
                self.n,
                field.len()
            ));
        }
        field[..self.n]
            .iter()
            .map(|&c| match c {
                b'0'..=b'9' if u32::from(c - b'0') < self.q => Ok(c - b'0'),
                b'0'..=b'9' => Err(format!(
                    "value {} is not less than the number of states {}",
                    c - b'0',
                    self.q
                )),
                _ => Err(format!("unexpected character {:?}", char::from(c))),
            })
            .collect()
    }

    /// Adds `count` copies of an observation. Only the first `n` values are used.
    ///
    /// ```
    /// use mincomp::Dataset;
    ///
    /// let mut data = Dataset::new(2, 3)?;
    /// data.add_observation(&[2, 1], 4)?;
    /// data.add_observation(&[2, 1, 7], 1)?;
    /// assert_eq!(data.sample_size(), 5);
    /// assert_eq!(data.unique_states(), 1);
    /// assert!(data.add_observation(&[3, 0], 1).is_err());
    /// assert!(data.add_observation(&[1], 1).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn add_observation(&mut self, values: &[u8], count: u32) -> Result<()> {
        if values.len() < self.n {
            return Err(Error::InvalidObservation(format!(
                "expected {} values, got {}",
                self.n,
                values.len()
            )));
        }
        let values = &values[..self.n];
        if let Some(&bad) = values.iter().find(|&&v| u32::from(v) >= self.q) {
            return Err(Error::InvalidObservation(format!(
                "value {} is not less than the number of states {}",
                bad, self.q
            )));
        }
        if count == 0 {
            return Ok(());
        }

        let mut state: State = smallvec![0; self.planes];
        for (variable, &value) in values.iter().enumerate() {
            for (plane, bits) in state.iter_mut().enumerate() {
                if (value >> plane) & 1 != 0 {
                    *bits |= 1 << variable;
                }
            }
        }

        let cell = self.histogram.entry(state).or_insert(0);
        *cell = cell.checked_add(count).ok_or_else(|| {
            Error::InvalidObservation("too many copies of the same observation".into())
        })?;
        self.sample_size += u64::from(count);
        Ok(())
    }

    /// Releases unused histogram capacity.
    pub fn shrink_to_fit(&mut self) {
        self.histogram.shrink_to_fit();
    }

    /// The number of variables.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The number of states each variable can take.
    pub fn q(&self) -> u32 {
        self.q
    }

    /// The number of bit planes a [`State`] uses: enough binary digits to write `q - 1`.
    pub fn planes(&self) -> usize {
        self.planes
    }

    /// The total number of observations, N.
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// The number of distinct observations.
    pub fn unique_states(&self) -> usize {
        self.histogram.len()
    }

    /// The sample size that evidence is scaled to. Unless it has been set explicitly, this
    /// follows the real sample size.
    pub fn assumed_sample_size(&self) -> u64 {
        self.assumed.unwrap_or(self.sample_size)
    }

    /// Overrides the sample size that evidence is scaled to.
    ///
    /// ```
    /// use mincomp::Dataset;
    ///
    /// let mut data = Dataset::new(2, 2)?;
    /// data.add_observation(&[0, 1], 3)?;
    /// data.set_assumed_sample_size(1000)?;
    /// assert_eq!(data.assumed_sample_size(), 1000);
    /// assert!(data.set_assumed_sample_size(0).is_err());
    /// assert_eq!(data.assumed_sample_size(), 1000);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn set_assumed_sample_size(&mut self, assumed: u64) -> Result<()> {
        if assumed == 0 {
            return Err(Error::InvalidSetting(
                "the assumed number of datapoints should be positive",
            ));
        }
        self.assumed = Some(assumed);
        Ok(())
    }

    /// Returns an iterator over every distinct observation and how often it occurred.
    pub fn states(&self) -> impl Iterator<Item = (&State, u32)> + '_ {
        self.histogram.iter().map(|(state, &count)| (state, count))
    }

    /// Builds the histogram of observations restricted to the variables in `component`.
    ///
    /// ```
    /// use mincomp::{Component, Dataset};
    ///
    /// let mut data = Dataset::new(3, 2)?;
    /// data.add_observation(&[1, 0, 0], 1)?;
    /// data.add_observation(&[1, 1, 0], 2)?;
    /// data.add_observation(&[0, 1, 1], 1)?;
    ///
    /// let first = data.project(Component::singleton(0));
    /// assert_eq!(first.len(), 2);
    /// assert_eq!(first.values().sum::<u32>(), 4);
    /// assert_eq!(data.project(Component::singleton(2)).len(), 2);
    /// assert_eq!(data.project(Component::full(3)).len(), 3);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn project(&self, component: Component) -> HashMap<State, u32> {
        let mask = component.bits();
        let mut counts = HashMap::with_capacity(self.histogram.len());
        for (state, &count) in self.histogram.iter() {
            let projected: State = state.iter().map(|plane| plane & mask).collect();
            *counts.entry(projected).or_insert(0) += count;
        }
        counts
    }

    /// The Shannon entropy of the observed distribution, in the given logarithm base. The
    /// default base is `q`.
    ///
    /// ```
    /// use mincomp::Dataset;
    ///
    /// let mut data = Dataset::new(2, 4)?;
    /// for values in [[0, 0], [1, 2], [3, 1], [2, 2]] {
    ///     data.add_observation(&values, 1)?;
    /// }
    /// assert!((data.entropy(Some(2))? - 2.0).abs() < 1e-12);
    /// assert!((data.entropy(None)? - 1.0).abs() < 1e-12);
    /// assert!(data.entropy(Some(1)).is_err());
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn entropy(&self, base: Option<u32>) -> Result<f64> {
        let base = base.unwrap_or(self.q);
        if base < 2 {
            return Err(Error::InvalidSetting(
                "the base of the logarithm should be at least 2",
            ));
        }
        if self.sample_size == 0 {
            return Ok(0.0);
        }
        let total = self.sample_size as f64;
        let weighted: f64 = self
            .histogram
            .values()
            .map(|&count| {
                let count = f64::from(count);
                count * count.ln()
            })
            .sum();
        Ok((total.ln() - weighted / total) / f64::from(base).ln())
    }

    /// `q` raised to the power `r`, for `r <= n`.
    pub(crate) fn q_power(&self, r: usize) -> f64 {
        self.q_powers[r]
    }

    fn state_string(&self, state: &State) -> String {
        (0..self.n)
            .map(|variable| {
                let value = state
                    .iter()
                    .enumerate()
                    .filter(|(_, bits)| **bits >> variable & 1 != 0)
                    .fold(0u32, |value, (plane, _)| value | 1 << plane);
                char::from_digit(value, 36).unwrap_or('?')
            })
            .collect()
    }
}

fn parse_count(field: &[u8]) -> Result<u32, String> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|field| field.trim().parse().ok())
        .ok_or_else(|| format!("malformed count {:?}", String::from_utf8_lossy(field)))
}
