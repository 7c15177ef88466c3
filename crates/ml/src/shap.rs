//! Exact path-dependent Shapley values for tree ensembles.
//!
//! Follows the polynomial-time TreeSHAP recursion: every root-to-leaf path
//! keeps the set of unique features it split on, together with the fraction
//! of training cover that flows down each side ("zero" fraction) and whether
//! the explained instance follows that side ("one" fraction). The per-tree
//! values sum to `f(x) - E[f]`, so averaging over trees keeps that property
//! for the ensemble.

use crate::tree::{goes_left, DecisionTree, TreeEnsemble, TreeNode};
use crate::{Classifier, ExplainError, Explainer, RawAttribution};

#[derive(Debug, Clone, Copy, Default)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

impl Explainer for TreeEnsemble {
    fn explain(
        &self,
        features: &[f64],
        class_index: usize,
    ) -> Result<RawAttribution, ExplainError> {
        if class_index >= self.n_classes() {
            return Err(ExplainError::ClassOutOfRange {
                class: class_index,
                n_classes: self.n_classes(),
            });
        }
        if features.len() != self.n_features() {
            return Err(ExplainError::FeatureCount {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let mut values = vec![0.0_f64; self.n_features()];
        for tree in self.trees() {
            let mut walker = TreeWalker {
                tree,
                features,
                class_index,
                phi: &mut values,
            };
            walker.recurse(0, &[], 0, 1.0, 1.0, None);
        }

        let count = self.trees().len() as f64;
        for value in &mut values {
            *value /= count;
        }

        Ok(RawAttribution {
            baseline: self.expected_value(class_index),
            values,
        })
    }
}

struct TreeWalker<'a> {
    tree: &'a DecisionTree,
    features: &'a [f64],
    class_index: usize,
    phi: &'a mut [f64],
}

impl TreeWalker<'_> {
    fn recurse(
        &mut self,
        node: usize,
        parent_path: &[PathElement],
        depth: usize,
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) {
        let mut path = parent_path[..depth].to_vec();
        path.resize(depth + 1, PathElement::default());
        extend_path(&mut path, depth, zero_fraction, one_fraction, feature);

        let tree = self.tree;
        match tree.node(node) {
            TreeNode::Leaf { value, .. } => {
                let leaf_value = value[self.class_index];
                for idx in 1..=depth {
                    let element = path[idx];
                    let weight = unwound_path_sum(&path, depth, idx);
                    if let Some(feature) = element.feature {
                        self.phi[feature] +=
                            weight * (element.one_fraction - element.zero_fraction) * leaf_value;
                    }
                }
            }
            TreeNode::Split {
                feature: split_feature,
                threshold,
                left,
                right,
                cover,
            } => {
                let (hot, cold) = if goes_left(self.features, *split_feature, *threshold) {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let hot_zero = tree.node(hot).cover() / cover;
                let cold_zero = tree.node(cold).cover() / cover;

                let mut depth = depth;
                let mut incoming_zero = 1.0;
                let mut incoming_one = 1.0;

                // A feature already on the path is undone and re-applied here.
                if let Some(idx) =
                    (1..=depth).find(|idx| path[*idx].feature == Some(*split_feature))
                {
                    incoming_zero = path[idx].zero_fraction;
                    incoming_one = path[idx].one_fraction;
                    unwind_path(&mut path, depth, idx);
                    depth -= 1;
                }

                self.recurse(
                    hot,
                    &path,
                    depth + 1,
                    hot_zero * incoming_zero,
                    incoming_one,
                    Some(*split_feature),
                );
                self.recurse(
                    cold,
                    &path,
                    depth + 1,
                    cold_zero * incoming_zero,
                    0.0,
                    Some(*split_feature),
                );
            }
        }
    }
}

fn extend_path(
    path: &mut [PathElement],
    depth: usize,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    path[depth] = PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    };

    let scale = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / scale;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / scale;
    }
}

fn unwind_path(path: &mut [PathElement], depth: usize, idx: usize) {
    let one_fraction = path[idx].one_fraction;
    let zero_fraction = path[idx].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let previous = path[i].weight;
            path[i].weight = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                previous - path[i].weight * zero_fraction * (depth - i) as f64 / scale;
        } else {
            path[i].weight = path[i].weight * scale / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in idx..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total path weight if the element at `idx` were unwound, without mutating.
fn unwound_path_sum(path: &[PathElement], depth: usize, idx: usize) -> f64 {
    let one_fraction = path[idx].one_fraction;
    let zero_fraction = path[idx].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let portion = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            total += portion;
            next_one_portion = path[i].weight - portion * zero_fraction * (depth - i) as f64 / scale;
        } else {
            total += path[i].weight / zero_fraction / ((depth - i) as f64 / scale);
        }
    }

    total
}
