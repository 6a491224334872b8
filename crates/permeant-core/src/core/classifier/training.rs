use super::forest::{DecisionTree, Node, RandomForest};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const FALLBACK_SEED: u64 = 42;
pub const FALLBACK_VERSION: &str = "synthetic-fallback";
pub const FALLBACK_SAMPLES: usize = 1000;
pub const FALLBACK_POSITIVE_RATE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 16,
            min_samples_split: 2,
            seed: FALLBACK_SEED,
        }
    }
}

/// Fits a CART random forest: bootstrap samples per tree and `sqrt(n_features)`
/// candidate features per split, Gini impurity.
///
/// Every tree draws from its own seeded generator, so the result does not depend on
/// thread scheduling.
pub fn fit_forest(
    features: &[Vec<f64>],
    labels: &[bool],
    n_features: usize,
    params: &ForestParams,
    version: &str,
) -> RandomForest {
    #[cfg(not(feature = "parallel"))]
    let iterator = 0..params.n_trees;

    #[cfg(feature = "parallel")]
    let iterator = (0..params.n_trees).into_par_iter();

    let trees = iterator
        .map(|t| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> = (0..labels.len())
                .map(|_| rng.gen_range(0..labels.len()))
                .collect();
            let mut builder = TreeBuilder {
                features,
                labels,
                n_features,
                params,
                rng,
                nodes: Vec::new(),
            };
            builder.grow(bootstrap, 0);
            DecisionTree {
                nodes: builder.nodes,
            }
        })
        .collect();

    RandomForest {
        version: version.to_string(),
        n_features,
        trees,
    }
}

/// The degraded-mode model: a forest fitted on random binary features with labels
/// drawn at a fixed positive rate. Its predictions carry no chemical meaning.
pub fn synthetic_fallback(n_features: usize, seed: u64) -> RandomForest {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(FALLBACK_SAMPLES);
    let mut labels = Vec::with_capacity(FALLBACK_SAMPLES);
    for _ in 0..FALLBACK_SAMPLES {
        features.push(
            (0..n_features)
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>(),
        );
        labels.push(rng.gen_bool(FALLBACK_POSITIVE_RATE));
    }
    let params = ForestParams {
        seed,
        ..ForestParams::default()
    };
    fit_forest(&features, &labels, n_features, &params, FALLBACK_VERSION)
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [bool],
    n_features: usize,
    params: &'a ForestParams,
    rng: StdRng,
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// Appends the subtree for `samples` and returns its root index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let positives = samples.iter().filter(|&&s| self.labels[s]).count();
        let probability = if samples.is_empty() {
            0.0
        } else {
            positives as f64 / samples.len() as f64
        };
        self.nodes.push(Node::Leaf { probability });

        let pure = positives == 0 || positives == samples.len();
        if pure || depth >= self.params.max_depth || samples.len() < self.params.min_samples_split
        {
            return idx;
        }
        let Some(split) = self.best_split(&samples) else {
            return idx;
        };

        let parent_impurity = gini(positives, samples.len());
        let weight = samples.len() as f64 / self.labels.len().max(1) as f64;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.features[s][split.feature] <= split.threshold);

        let left_idx = self.grow(left, depth + 1);
        let right_idx = self.grow(right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
            impurity_decrease: weight * (parent_impurity - split.impurity),
        };
        idx
    }

    /// Best split over `sqrt(n_features)` random candidates. When every candidate is
    /// constant over `samples`, the remaining features are scanned in order.
    fn best_split(&mut self, samples: &[usize]) -> Option<Split> {
        if self.n_features == 0 {
            return None;
        }
        let n_candidates = ((self.n_features as f64).sqrt() as usize).clamp(1, self.n_features);
        let candidates = sample(&mut self.rng, self.n_features, n_candidates);
        let mut column: Vec<(f64, bool)> = Vec::with_capacity(samples.len());

        let mut best: Option<Split> = None;
        for feature in candidates.iter() {
            self.evaluate(feature, samples, &mut column, &mut best);
        }
        if best.is_none() {
            for feature in 0..self.n_features {
                self.evaluate(feature, samples, &mut column, &mut best);
                if best.is_some() {
                    break;
                }
            }
        }
        best
    }

    fn evaluate(
        &self,
        feature: usize,
        samples: &[usize],
        column: &mut Vec<(f64, bool)>,
        best: &mut Option<Split>,
    ) {
        column.clear();
        column.extend(
            samples
                .iter()
                .map(|&s| (self.features[s][feature], self.labels[s])),
        );
        column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        let total_pos = column.iter().filter(|(_, label)| *label).count();

        let mut left_pos = 0usize;
        for i in 0..column.len().saturating_sub(1) {
            if column[i].1 {
                left_pos += 1;
            }
            if column[i].0 == column[i + 1].0 {
                continue;
            }
            let n_left = i + 1;
            let n_right = column.len() - n_left;
            let impurity = (n_left as f64 * gini(left_pos, n_left)
                + n_right as f64 * gini(total_pos - left_pos, n_right))
                / column.len() as f64;
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                *best = Some(Split {
                    feature,
                    threshold: (column[i].0 + column[i + 1].0) / 2.0,
                    impurity,
                });
            }
        }
    }
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learns_a_separable_feature() {
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 2) as f64, ((i / 2) % 3) as f64])
            .collect();
        let labels: Vec<bool> = (0..40).map(|i| i % 2 == 1).collect();
        let params = ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        };
        let forest = fit_forest(&features, &labels, 2, &params, "test");
        forest.validate().unwrap();
        assert!(forest.predict_proba(&[1.0, 0.0]).unwrap() > 0.5);
        assert!(forest.predict_proba(&[0.0, 0.0]).unwrap() < 0.5);
        assert_eq!(forest.feature_importance(1)[0].0, 0);
    }

    #[test]
    fn synthetic_fallback_is_deterministic() {
        let a = synthetic_fallback(16, FALLBACK_SEED);
        let b = synthetic_fallback(16, FALLBACK_SEED);
        assert_eq!(a, b);
        assert_eq!(a.version, FALLBACK_VERSION);
        assert_eq!(a.trees.len(), 100);
        a.validate().unwrap();
    }

    #[test]
    fn synthetic_fallback_predicts_probabilities() {
        let forest = synthetic_fallback(8, FALLBACK_SEED);
        let p = forest.predict_proba(&[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn gini_of_pure_and_balanced_sets() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert!((gini(5, 10) - 0.5).abs() < 1e-12);
    }
}
