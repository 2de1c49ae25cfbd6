// 隨機森林迴歸：CART 樹 + bootstrap 平均

pub use crate::domain::model::ForestParams;
use crate::domain::ports::Regressor;
use crate::utils::error::{PredictorError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Type alias for tree node indices.
pub type NodeId = u32;

/// Sentinel value for "no child" (leaf nodes).
pub const NO_CHILD: NodeId = u32::MAX;

/// A single tree node.
///
/// Struct layout (not enum) keeps nodes fixed-size; `is_leaf` tells split
/// and leaf nodes apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index for split.
    pub feature: u32,
    /// Samples with `x[feature] <= threshold` go left.
    pub threshold: f64,
    pub left: NodeId,
    pub right: NodeId,
    /// Leaf prediction value.
    pub value: f64,
    pub is_leaf: bool,
}

impl TreeNode {
    #[inline]
    pub fn leaf(value: f64) -> Self {
        Self {
            feature: 0,
            threshold: 0.0,
            left: NO_CHILD,
            right: NO_CHILD,
            value,
            is_leaf: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    max_depth: usize,
}

impl RegressionTree {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Maximum depth reached.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut id = 0usize;
        loop {
            let node = &self.nodes[id];
            if node.is_leaf {
                return node.value;
            }
            id = if features[node.feature as usize] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// Checks that traversal from the root always ends at a leaf and only
    /// reads features below `n_features`.
    pub fn check_structure(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(PredictorError::ModelError {
                message: "Tree has no nodes".to_string(),
            });
        }

        let n_nodes = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            if node.is_leaf {
                if !node.value.is_finite() {
                    return Err(PredictorError::ModelError {
                        message: format!("Leaf {} has non-finite value {}", id, node.value),
                    });
                }
                continue;
            }

            // 子節點編號必須在範圍內且大於父節點，確保走訪不會循環
            for child in [node.left, node.right] {
                let child = child as usize;
                if child == NO_CHILD as usize || child >= n_nodes || child <= id {
                    return Err(PredictorError::ModelError {
                        message: format!("Node {} has invalid child {}", id, child),
                    });
                }
            }
            if node.feature as usize >= n_features {
                return Err(PredictorError::ModelError {
                    message: format!(
                        "Node {} splits on feature {} but the model has {} features",
                        id, node.feature, n_features
                    ),
                });
            }
            if !node.threshold.is_finite() {
                return Err(PredictorError::ModelError {
                    message: format!("Node {} has non-finite threshold", id),
                });
            }
        }
        Ok(())
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    /// Number of samples (after sorting by `feature`) that go left.
    n_left: usize,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a ForestParams,
    n_features: usize,
    nodes: Vec<TreeNode>,
    depth_reached: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(x: &'a [Vec<f64>], y: &'a [f64], params: &'a ForestParams, n_features: usize) -> Self {
        Self {
            x,
            y,
            params,
            n_features,
            nodes: Vec::new(),
            depth_reached: 0,
        }
    }

    fn finish(self) -> RegressionTree {
        RegressionTree {
            nodes: self.nodes,
            max_depth: self.depth_reached,
        }
    }

    fn build(&mut self, samples: &mut [usize], depth: usize, rng: &mut StdRng) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let mean = samples.iter().map(|&i| self.y[i]).sum::<f64>() / samples.len() as f64;
        self.nodes.push(TreeNode::leaf(mean));
        self.depth_reached = self.depth_reached.max(depth);

        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
        {
            return id;
        }

        let Some(split) = self.best_split(samples, rng) else {
            return id;
        };

        // 依切分特徵排序後，前 n_left 個樣本進入左子樹
        samples.sort_by(|&a, &b| self.x[a][split.feature].total_cmp(&self.x[b][split.feature]));
        let (left_samples, right_samples) = samples.split_at_mut(split.n_left);

        let left = self.build(left_samples, depth + 1, rng);
        let right = self.build(right_samples, depth + 1, rng);

        let node = &mut self.nodes[id as usize];
        node.is_leaf = false;
        node.feature = split.feature as u32;
        node.threshold = split.threshold;
        node.left = left;
        node.right = right;
        id
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        match self.params.max_features {
            Some(k) if k > 0 && k < self.n_features => {
                features.shuffle(rng);
                features.truncate(k);
                features
            }
            _ => features,
        }
    }

    fn best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total_sum: f64 = samples.iter().map(|&i| self.y[i]).sum();
        let parent_score = total_sum * total_sum / n as f64;

        let mut best: Option<(f64, Split)> = None;
        let mut order: Vec<usize> = samples.to_vec();

        for feature in self.candidate_features(rng) {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.y[order[pos]];
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = self.x[order[pos]][feature];
                let next = self.x[order[pos + 1]][feature];
                if next <= here {
                    continue;
                }

                // 最大化 sum_l²/n_l + sum_r²/n_r 等同於最小化子節點平方誤差
                let right_sum = total_sum - left_sum;
                let score = left_sum * left_sum / n_left as f64
                    + right_sum * right_sum / n_right as f64;
                if score <= parent_score + 1e-9 {
                    continue;
                }

                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((
                        score,
                        Split {
                            feature,
                            threshold: here + (next - here) / 2.0,
                            n_left,
                        },
                    ));
                }
            }
        }

        best.map(|(_, split)| split)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fit a forest on row-major `x` and targets `y`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams, seed: u64) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(PredictorError::ModelError {
                message: format!(
                    "Cannot fit forest on {} feature rows and {} targets",
                    x.len(),
                    y.len()
                ),
            });
        }
        if params.n_estimators == 0 {
            return Err(PredictorError::ModelError {
                message: "Forest needs at least one tree".to_string(),
            });
        }

        let n_features = x[0].len();
        if let Some(bad) = x.iter().position(|row| row.len() != n_features) {
            return Err(PredictorError::ModelError {
                message: format!(
                    "Row {} has {} features, expected {}",
                    bad,
                    x[bad].len(),
                    n_features
                ),
            });
        }

        let n = x.len();
        let trees = (0..params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let mut samples: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };

                let mut builder = TreeBuilder::new(x, y, &params, n_features);
                builder.build(&mut samples, 0, &mut rng);
                builder.finish()
            })
            .collect();

        Ok(Self {
            params,
            n_features,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validates a deserialized forest before it is used for prediction.
    pub fn check_structure(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(PredictorError::ModelError {
                message: "Forest has no trees".to_string(),
            });
        }
        if self.n_features == 0 {
            return Err(PredictorError::ModelError {
                message: "Forest has zero input features".to_string(),
            });
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.check_structure(self.n_features).map_err(|e| PredictorError::ModelError {
                message: format!("Tree {}: {}", t, e),
            })?;
        }
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        self.trees.iter().map(|t| t.predict(features)).sum::<f64>() / self.trees.len() as f64
    }
}

impl Regressor for RandomForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, features: &[f64]) -> f64 {
        self.predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 100.0 } else { 300.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_single_tree_learns_step() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 1,
            bootstrap: false,
            min_samples_leaf: 1,
            ..Default::default()
        };
        let forest = RandomForestRegressor::fit(&x, &y, params, 7).unwrap();

        assert_eq!(forest.n_trees(), 1);
        assert_eq!(forest.predict(&[3.0, 0.0]), 100.0);
        assert_eq!(forest.predict(&[35.0, 1.0]), 300.0);
        let root = &forest.trees()[0].nodes()[0];
        assert!(!root.is_leaf);
        assert_eq!(root.feature, 0);
        assert!((root.threshold - 19.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![5.0; 10];
        let forest = RandomForestRegressor::fit(&x, &y, ForestParams::default(), 1).unwrap();
        for tree in forest.trees() {
            assert_eq!(tree.nodes().len(), 1);
            assert_eq!(tree.n_leaves(), 1);
        }
        assert_eq!(forest.predict(&[3.0]), 5.0);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let params = ForestParams {
            n_estimators: 5,
            max_depth: 3,
            ..Default::default()
        };
        let forest = RandomForestRegressor::fit(&x, &y, params, 3).unwrap();
        assert!(forest.trees().iter().all(|t| t.max_depth() <= 3));
        assert!(forest.trees().iter().all(|t| t.n_leaves() <= 8));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = step_data();
        let params = ForestParams {
            n_estimators: 8,
            max_features: Some(1),
            ..Default::default()
        };
        let a = RandomForestRegressor::fit(&x, &y, params, 42).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, params, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predictions_stay_within_target_range() {
        let (x, y) = step_data();
        let forest = RandomForestRegressor::fit(&x, &y, ForestParams::default(), 9).unwrap();
        for i in 0..40 {
            let p = forest.predict(&[i as f64, 0.0]);
            assert!((100.0..=300.0).contains(&p));
        }
    }

    fn single_split_forest() -> RandomForestRegressor {
        let mut root = TreeNode::leaf(0.0);
        root.is_leaf = false;
        root.feature = 0;
        root.threshold = 1.5;
        root.left = 1;
        root.right = 2;
        RandomForestRegressor {
            params: ForestParams::default(),
            n_features: 2,
            trees: vec![RegressionTree {
                nodes: vec![root, TreeNode::leaf(10.0), TreeNode::leaf(20.0)],
                max_depth: 1,
            }],
        }
    }

    #[test]
    fn test_fitted_forest_passes_structure_check() {
        let (x, y) = step_data();
        let forest = RandomForestRegressor::fit(&x, &y, ForestParams::default(), 3).unwrap();
        assert!(forest.check_structure().is_ok());
        assert!(single_split_forest().check_structure().is_ok());
    }

    #[test]
    fn test_structure_check_rejects_broken_trees() {
        let mut empty = single_split_forest();
        empty.trees[0].nodes.clear();

        let mut no_trees = single_split_forest();
        no_trees.trees.clear();

        let mut out_of_bounds = single_split_forest();
        out_of_bounds.trees[0].nodes[0].right = 7;

        let mut sentinel = single_split_forest();
        sentinel.trees[0].nodes[0].left = NO_CHILD;

        let mut cycle = single_split_forest();
        cycle.trees[0].nodes[0].left = 0;

        let mut bad_feature = single_split_forest();
        bad_feature.trees[0].nodes[0].feature = 2;

        let mut nan_threshold = single_split_forest();
        nan_threshold.trees[0].nodes[0].threshold = f64::NAN;

        for (name, forest) in [
            ("empty", empty),
            ("no trees", no_trees),
            ("out of bounds", out_of_bounds),
            ("sentinel", sentinel),
            ("cycle", cycle),
            ("bad feature", bad_feature),
            ("nan threshold", nan_threshold),
        ] {
            assert!(
                matches!(forest.check_structure(), Err(PredictorError::ModelError { .. })),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_invalid_training_data() {
        assert!(RandomForestRegressor::fit(&[], &[], ForestParams::default(), 0).is_err());
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(RandomForestRegressor::fit(&ragged, &[1.0, 2.0], ForestParams::default(), 0).is_err());
        let params = ForestParams {
            n_estimators: 0,
            ..Default::default()
        };
        assert!(RandomForestRegressor::fit(&[vec![1.0]], &[1.0], params, 0).is_err());
    }
}
