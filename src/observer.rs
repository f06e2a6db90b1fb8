use crate::data::Dataset;
use crate::model::Model;
use crate::search::Algorithm;
use crate::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Hooks that a [`PartitionSearch`](crate::PartitionSearch) calls as it works.
///
/// Every method does nothing by default, so an observer only needs to implement the events it
/// cares about.
pub trait SearchObserver {
    /// A search is about to start. `initial` is the scored starting model, which exhaustive
    /// search doesn't have.
    fn started(&mut self, algorithm: Algorithm, data: &Dataset, initial: Option<&Model>) {
        let _ = (algorithm, data, initial);
    }

    /// The best log-evidence found so far went up. `temperature` is only set during simulated
    /// annealing.
    fn improved(&mut self, step: usize, log_evidence: f64, temperature: Option<f64>) {
        let _ = (step, log_evidence, temperature);
    }

    /// Simulated annealing went too many iterations without improving and stopped early.
    fn stalled(&mut self, step: usize) {
        let _ = step;
    }

    /// The search finished with `result`.
    fn finished(&mut self, data: &Dataset, result: &Model) {
        let _ = (data, result);
    }
}

/// Writes a human-readable report of a search.
///
/// Evidence is reported both in nats and in q-its per datapoint, which is the evidence divided by
/// `N ln q`.
///
/// Write errors don't interrupt the search. The first one is logged and the report is abandoned.
pub struct LogFile<W: Write = BufWriter<File>> {
    out: Option<W>,
    units: f64,
}

impl LogFile {
    /// Creates (or truncates) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(LogFile::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> LogFile<W> {
    /// Writes the report to `out`.
    pub fn new(out: W) -> Self {
        LogFile {
            out: Some(out),
            units: 1.0,
        }
    }

    /// Gives back the writer, unless writing to it failed.
    pub fn into_inner(self) -> Option<W> {
        self.out
    }

    fn attempt<F>(&mut self, write: F)
    where
        F: FnOnce(&mut W, f64) -> io::Result<()>,
    {
        if let Some(out) = self.out.as_mut() {
            if let Err(error) = write(out, self.units).and_then(|_| out.flush()) {
                tracing::warn!(%error, "giving up on the search log");
                self.out = None;
            }
        }
    }
}

fn heading<W: Write>(out: &mut W, title: &str, underline: char) -> io::Result<()> {
    let rule: String = std::iter::repeat(underline).take(title.len()).collect();
    writeln!(out, "{}:", title)?;
    writeln!(out, "{}", rule)?;
    writeln!(out)
}

fn components<W: Write>(out: &mut W, model: &Model, units: f64) -> io::Result<()> {
    let per_component = model.best_log_evidence_per_component().unwrap_or(&[]);
    for (index, c) in model.partition().iter().enumerate() {
        write!(
            out,
            "Component {} :\t{}\t Size: {}",
            index,
            c.to_bit_string(model.n()),
            c.len()
        )?;
        if let Some(evidence) = per_component.get(index) {
            write!(out, "\t Log-evidence (q-its/datapoint): {}", evidence / units)?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

impl<W: Write> SearchObserver for LogFile<W> {
    fn started(&mut self, algorithm: Algorithm, data: &Dataset, initial: Option<&Model>) {
        self.units = data.assumed_sample_size() as f64 * f64::from(data.q()).ln();
        self.attempt(|out, units| {
            let title = format!("{} Procedure", algorithm);
            let rule: String = std::iter::repeat('=').take(title.len()).collect();
            writeln!(out, "{}\n{}\n{}\n", rule, title, rule)?;

            heading(out, "Data statistics", '-')?;
            writeln!(out, "Number of variables: {}", data.n())?;
            writeln!(out, "Number of states per variable: {}", data.q())?;
            writeln!(out, "Number of datapoints: {}", data.sample_size())?;
            writeln!(out, "Number of unique datapoints: {}", data.unique_states())?;
            if let Ok(entropy) = data.entropy(None) {
                writeln!(out, "Entropy of the data: {} q-its", entropy)?;
            }
            writeln!(out)?;

            if let Some(model) = initial {
                heading(out, "Initial partition", '-')?;
                if let Ok(evidence) = model.best_log_evidence() {
                    writeln!(
                        out,
                        "Log-evidence: {} = {} q-its/datapoint\n",
                        evidence,
                        evidence / units
                    )?;
                }
                components(out, model, units)?;
            }
            heading(out, "Search", '-')
        });
    }

    fn improved(&mut self, step: usize, log_evidence: f64, temperature: Option<f64>) {
        self.attempt(|out, units| {
            write!(out, "Iteration {}", step)?;
            if let Some(temperature) = temperature {
                write!(out, "\t\t Temperature: {}", temperature)?;
            }
            writeln!(
                out,
                "\t\t Log-evidence (q-its/datapoint): {}",
                log_evidence / units
            )
        });
    }

    fn stalled(&mut self, step: usize) {
        self.attempt(|out, _| {
            writeln!(
                out,
                "\nMaximum number of iterations without improvement reached at iteration {}",
                step
            )
        });
    }

    fn finished(&mut self, data: &Dataset, result: &Model) {
        self.attempt(|out, units| {
            writeln!(out)?;
            heading(out, "Final partition", '-')?;
            if let Ok(evidence) = result.best_log_evidence() {
                writeln!(
                    out,
                    "Log-evidence: {} = {} q-its/datapoint",
                    evidence,
                    evidence / units
                )?;
            }
            if let Ok(likelihood) = data.log_likelihood(result.partition()) {
                writeln!(
                    out,
                    "Max-Log-likelihood: {} = {} q-its/datapoint",
                    likelihood,
                    likelihood / units
                )?;
            }
            writeln!(out)?;
            components(out, result, units)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partition;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_sections() {
        let data = crate::evidence::tests::fixture();
        let model = Model::from(Partition::complete(3).unwrap());
        let mut log = LogFile::new(Vec::new());
        log.started(Algorithm::GreedyMerge, &data, Some(&model));
        log.improved(1, -23.3, None);
        log.finished(&data, &model);
        let text = String::from_utf8(log.into_inner().unwrap()).unwrap();

        assert!(text.starts_with("========================\nGreedy Merging Procedure\n"));
        assert!(text.contains("Number of datapoints: 7\n"));
        assert!(text.contains("Number of unique datapoints: 6\n"));
        assert!(text.contains("Initial partition:\n"));
        assert!(text.contains("Iteration 1\t\t Log-evidence"));
        assert!(text.contains("Final partition:\n"));
        assert!(text.contains("Component 0 :\t111\t Size: 3\n"));
    }

    #[test]
    fn units_follow_the_assumed_sample_size() {
        let mut data = crate::evidence::tests::fixture();
        data.set_assumed_sample_size(70).unwrap();
        let mut log = LogFile::new(Vec::new());
        log.started(Algorithm::SimulatedAnnealing, &data, None);
        log.improved(4, -70.0 * 3f64.ln(), Some(2.5));
        let text = String::from_utf8(log.into_inner().unwrap()).unwrap();
        assert!(text.contains("Number of datapoints: 7\n"));
        assert!(text.contains(
            "Iteration 4\t\t Temperature: 2.5\t\t Log-evidence (q-its/datapoint): -1\n"
        ));
    }

    #[test]
    fn write_errors_disable_the_log() {
        let data = crate::evidence::tests::fixture();
        let mut log = LogFile::new(Broken);
        log.started(Algorithm::Exhaustive, &data, None);
        log.improved(0, -1.0, None);
        assert!(log.into_inner().is_none());
    }
}
