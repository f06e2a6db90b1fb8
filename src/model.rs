use crate::component::Component;
use crate::partition::Partition;
use crate::{Error, Result};
use rand::Rng;
use std::str::FromStr;

/// A named starting partition.
///
/// ```
/// use mincomp::Template;
///
/// assert_eq!("complete".parse::<Template>()?, Template::Complete);
/// assert!("everything".parse::<Template>().is_err());
/// # Ok::<(), mincomp::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Template {
    /// Every variable in its own component.
    Independent,
    /// All variables in one component.
    Complete,
    /// Each variable in a uniformly chosen one of `n` slots.
    Random,
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "independent" => Ok(Template::Independent),
            "complete" => Ok(Template::Complete),
            "random" => Ok(Template::Random),
            _ => Err(Error::UnknownTemplate(s.to_string())),
        }
    }
}

/// A minimally complex model: a partition of the variables, plus the evidence a search found for
/// it.
///
/// A model fresh from a constructor only has a partition. Once a search has optimized it, the
/// total and per-component log-evidence become available. Changing the partition by hand throws
/// those results away again.
///
/// ```
/// use mincomp::{Error, Model};
///
/// let mut model = Model::new(4)?;
/// assert_eq!(model.component_count(), 4);
/// assert!(matches!(model.best_log_evidence(), Err(Error::NotOptimized)));
///
/// model.move_variable(3, 0)?;
/// assert_eq!(model.labels(), vec![Some(0), Some(1), Some(2), Some(0)]);
/// # Ok::<(), mincomp::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Model {
    partition: Partition,
    results: Option<Evaluation>,
}

#[derive(Clone, Debug)]
struct Evaluation {
    log_evidence: f64,
    per_component: Vec<f64>,
}

impl From<Partition> for Model {
    fn from(partition: Partition) -> Self {
        Model {
            partition,
            results: None,
        }
    }
}

impl Model {
    /// Creates a model of `n` independent variables.
    pub fn new(n: usize) -> Result<Self> {
        Ok(Partition::independent(n)?.into())
    }

    /// Creates a model from component masks. Empty masks are ignored.
    pub fn from_partition(n: usize, masks: &[Component]) -> Result<Self> {
        Ok(Partition::new(n, masks)?.into())
    }

    /// Creates a model from a 0/1 matrix with one row per component.
    pub fn from_matrix<R: AsRef<[u8]>>(n: usize, rows: &[R]) -> Result<Self> {
        Ok(Partition::from_matrix(n, rows)?.into())
    }

    /// Creates a model from per-variable component labels.
    pub fn from_labels(n: usize, labels: &[Option<usize>]) -> Result<Self> {
        Ok(Partition::from_labels(n, labels)?.into())
    }

    /// Creates a model from a named template. Only [`Template::Random`] draws from `rng`.
    ///
    /// ```
    /// use mincomp::{Model, Template};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(5);
    /// let model = Model::with_template(6, "random".parse()?, &mut rng)?;
    /// assert_eq!(model.rank(), 6);
    /// assert_eq!(Model::with_template(6, Template::Complete, &mut rng)?.component_count(), 1);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn with_template<R: Rng + ?Sized>(n: usize, template: Template, rng: &mut R) -> Result<Self> {
        let partition = match template {
            Template::Independent => Partition::independent(n)?,
            Template::Complete => Partition::complete(n)?,
            Template::Random => Partition::random(n, rng)?,
        };
        Ok(partition.into())
    }

    /// The number of variables.
    pub fn n(&self) -> usize {
        self.partition.n()
    }

    /// The number of non-empty components.
    pub fn component_count(&self) -> usize {
        self.partition.len()
    }

    /// The number of variables some component covers.
    pub fn rank(&self) -> usize {
        self.partition.rank()
    }

    /// The current partition.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The partition as `n` component masks, empty ones last.
    pub fn masks(&self) -> Vec<Component> {
        self.partition.masks()
    }

    /// The partition as a 0/1 matrix with one row per component.
    pub fn matrix(&self) -> Vec<Vec<u8>> {
        self.partition.to_matrix()
    }

    /// The partition as a label per variable.
    pub fn labels(&self) -> Vec<Option<usize>> {
        self.partition.to_labels()
    }

    /// Returns `true` if a search has scored this model and nothing has changed it since.
    pub fn is_optimized(&self) -> bool {
        self.results.is_some()
    }

    /// The log-evidence of the partition, as found by the search that produced this model.
    pub fn best_log_evidence(&self) -> Result<f64> {
        self.results
            .as_ref()
            .map(|r| r.log_evidence)
            .ok_or(Error::NotOptimized)
    }

    /// The log-evidence of each component, in the same order as [`Model::partition`].
    pub fn best_log_evidence_per_component(&self) -> Result<&[f64]> {
        self.results
            .as_ref()
            .map(|r| r.per_component.as_slice())
            .ok_or(Error::NotOptimized)
    }

    /// Replaces the partition.
    pub fn set_partition(&mut self, partition: Partition) -> Result<()> {
        if partition.n() != self.n() {
            return Err(Error::InvalidPartition(format!(
                "expected a partition of {} variables, got {}",
                self.n(),
                partition.n()
            )));
        }
        self.partition = partition;
        self.results = None;
        Ok(())
    }

    /// Adds a variable that isn't in any component to the component at `component`. An index
    /// past the last component puts the variable in a new component of its own.
    pub fn move_variable_in(&mut self, variable: usize, component: usize) -> Result<()> {
        self.partition.add_variable(variable, component)?;
        self.results = None;
        Ok(())
    }

    /// Takes a variable out of its component, leaving it unassigned. A component left empty is
    /// removed and later components shift down.
    pub fn move_variable_out(&mut self, variable: usize) -> Result<()> {
        self.partition.remove_variable(variable)?;
        self.results = None;
        Ok(())
    }

    /// Moves a variable to the component at `component`, as numbered after taking the variable
    /// out of its current one.
    ///
    /// ```
    /// use mincomp::Model;
    ///
    /// let mut model = Model::from_labels(3, &[Some(0), Some(1), Some(1)])?;
    /// // Variable 0 leaves its singleton, so the old component 1 is now component 0.
    /// model.move_variable(0, 0)?;
    /// assert_eq!(model.component_count(), 1);
    /// # Ok::<(), mincomp::Error>(())
    /// ```
    pub fn move_variable(&mut self, variable: usize, component: usize) -> Result<()> {
        let mut partition = self.partition.clone();
        partition.remove_variable(variable)?;
        partition.add_variable(variable, component)?;
        self.partition = partition;
        self.results = None;
        Ok(())
    }

    /// Stores search results. `per_component` must line up with the partition's components.
    pub(crate) fn optimized(partition: Partition, log_evidence: f64, per_component: Vec<f64>) -> Self {
        debug_assert_eq!(partition.len(), per_component.len());
        Model {
            partition,
            results: Some(Evaluation {
                log_evidence,
                per_component,
            }),
        }
    }
}

impl std::fmt::Display for Model {
    /// Lists the components, with their evidence if the model has been optimized.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.n();
        writeln!(
            f,
            "{} components covering {} of {} variables",
            self.component_count(),
            self.rank(),
            n
        )?;
        for (index, c) in self.partition.iter().enumerate() {
            write!(f, "  {}  size {}", c.to_bit_string(n), c.len())?;
            if let Some(results) = &self.results {
                write!(f, "  log-evidence {:.5}", results.per_component[index])?;
            }
            writeln!(f)?;
        }
        if let Some(results) = &self.results {
            writeln!(f, "  total log-evidence {:.5}", results.log_evidence)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored() -> Model {
        Model::optimized(Partition::complete(3).unwrap(), -23.3, vec![-23.3])
    }

    #[test]
    fn moves_invalidate_results() {
        let mut model = scored();
        assert!(model.is_optimized());
        model.move_variable_out(2).unwrap();
        assert!(!model.is_optimized());
        assert!(matches!(
            model.best_log_evidence_per_component(),
            Err(Error::NotOptimized)
        ));

        let mut model = scored();
        model.move_variable(1, 7).unwrap();
        assert!(!model.is_optimized());
        assert_eq!(model.labels(), vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn failed_moves_change_nothing() {
        let mut model = scored();
        assert!(matches!(
            model.move_variable_in(0, 0),
            Err(Error::VariablePresent(0))
        ));
        assert!(matches!(
            model.move_variable(5, 0),
            Err(Error::VariableIndex { index: 5, n: 3 })
        ));
        assert!(model.is_optimized());
        assert_eq!(model.best_log_evidence().unwrap(), -23.3);
    }

    #[test]
    fn move_in_after_move_out() {
        let mut model = Model::new(3).unwrap();
        model.move_variable_out(1).unwrap();
        assert_eq!(model.rank(), 2);
        model.move_variable_in(1, 0).unwrap();
        assert_eq!(model.masks(), [0b011, 0b100, 0].map(Component::from_bits).to_vec());
        assert_eq!(model.matrix(), vec![vec![1, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn set_partition_checks_size() {
        let mut model = scored();
        assert!(model.set_partition(Partition::independent(4).unwrap()).is_err());
        assert!(model.is_optimized());
        model.set_partition(Partition::independent(3).unwrap()).unwrap();
        assert!(!model.is_optimized());
    }

    #[test]
    fn display_lists_components() {
        let text = scored().to_string();
        assert!(text.starts_with("1 components covering 3 of 3 variables\n"));
        assert!(text.contains("  111  size 3  log-evidence -23.30000\n"));
        assert!(text.ends_with("  total log-evidence -23.30000\n"));
        assert!(!Model::new(2).unwrap().to_string().contains("log-evidence"));
    }
}
