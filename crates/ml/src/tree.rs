use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Classifier, Explainer};

const COVER_TOLERANCE: f64 = 1e-6;
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Node of a fitted decision tree, addressed by index into the tree's node list.
///
/// `cover` is the training weight that reached the node; attribution needs it
/// to weigh the branch an instance did not take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Goes `left` when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    /// Class distribution at a leaf.
    Leaf { value: Vec<f64>, cover: f64 },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            Self::Split { cover, .. } | Self::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub(crate) fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }

    pub(crate) fn leaf_for(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if goes_left(features, *feature, *threshold) {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value, .. } => return value,
            }
        }
    }

    /// Cover-weighted mean of `class` over the leaves.
    pub(crate) fn expected_value(&self, idx: usize, class: usize) -> f64 {
        match &self.nodes[idx] {
            TreeNode::Leaf { value, .. } => value[class],
            TreeNode::Split {
                left, right, cover, ..
            } => {
                let left_share = self.nodes[*left].cover() / cover;
                let right_share = self.nodes[*right].cover() / cover;
                left_share * self.expected_value(*left, class)
                    + right_share * self.expected_value(*right, class)
            }
        }
    }

    fn validate(&self, tree: usize, n_features: usize, n_classes: usize) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::EmptyTree { tree });
        }

        let mut parents = vec![0_usize; self.nodes.len()];

        for (node, entry) in self.nodes.iter().enumerate() {
            let cover = entry.cover();
            if !cover.is_finite() || cover <= 0.0 {
                return Err(TreeError::Cover { tree, node });
            }

            match entry {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    cover,
                } => {
                    if *feature >= n_features {
                        return Err(TreeError::FeatureIndex {
                            tree,
                            node,
                            feature: *feature,
                            n_features,
                        });
                    }
                    if !threshold.is_finite() {
                        return Err(TreeError::Threshold { tree, node });
                    }
                    for child in [*left, *right] {
                        if child <= node || child >= self.nodes.len() {
                            return Err(TreeError::ChildIndex { tree, node, child });
                        }
                        parents[child] += 1;
                    }
                    let children = self.nodes[*left].cover() + self.nodes[*right].cover();
                    if (children - cover).abs() > COVER_TOLERANCE * cover {
                        return Err(TreeError::CoverMismatch { tree, node });
                    }
                }
                TreeNode::Leaf { value, .. } => {
                    if value.len() != n_classes {
                        return Err(TreeError::LeafWidth {
                            tree,
                            node,
                            expected: n_classes,
                            actual: value.len(),
                        });
                    }
                    let in_range = value
                        .iter()
                        .all(|p| p.is_finite() && (0.0..=1.0).contains(p));
                    let total = value.iter().sum::<f64>();
                    if !in_range || (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
                        return Err(TreeError::LeafDistribution { tree, node });
                    }
                }
            }
        }

        if let Some(node) = (1..self.nodes.len()).find(|idx| parents[*idx] != 1) {
            return Err(TreeError::Structure { tree, node });
        }

        Ok(())
    }
}

/// Threshold comparison shared by prediction and attribution. A missing
/// column compares false and follows the right branch.
pub(crate) fn goes_left(features: &[f64], feature: usize, threshold: f64) -> bool {
    features
        .get(feature)
        .map(|value| *value <= threshold)
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("ensemble has no trees")]
    EmptyEnsemble,
    #[error("ensemble needs at least one feature and two classes")]
    Shape,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node}: cover must be positive and finite")]
    Cover { tree: usize, node: usize },
    #[error("tree {tree} node {node}: children covers do not add up")]
    CoverMismatch { tree: usize, node: usize },
    #[error("tree {tree} node {node}: feature {feature} outside 0..{n_features}")]
    FeatureIndex {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },
    #[error("tree {tree} node {node}: threshold must be finite")]
    Threshold { tree: usize, node: usize },
    #[error("tree {tree} node {node}: child {child} must come later in the node list")]
    ChildIndex {
        tree: usize,
        node: usize,
        child: usize,
    },
    #[error("tree {tree} node {node}: leaf has {actual} classes, expected {expected}")]
    LeafWidth {
        tree: usize,
        node: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tree {tree} node {node}: leaf is not a probability distribution")]
    LeafDistribution { tree: usize, node: usize },
    #[error("tree {tree} node {node}: every non-root node needs exactly one parent")]
    Structure { tree: usize, node: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RawEnsemble {
    name: String,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

/// Bagged decision trees whose class distributions are averaged.
///
/// Built only through [`TreeEnsemble::new`] or deserialization, both of
/// which validate the node structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnsemble", into = "RawEnsemble")]
pub struct TreeEnsemble {
    name: String,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub fn new(
        name: impl Into<String>,
        n_features: usize,
        n_classes: usize,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, TreeError> {
        if trees.is_empty() {
            return Err(TreeError::EmptyEnsemble);
        }
        if n_features == 0 || n_classes < 2 {
            return Err(TreeError::Shape);
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.validate(idx, n_features, n_classes)?;
        }

        Ok(Self {
            name: name.into(),
            n_features,
            n_classes,
            trees,
        })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of each tree's expected output for `class`.
    pub fn expected_value(&self, class: usize) -> f64 {
        let total = self
            .trees
            .iter()
            .map(|tree| tree.expected_value(0, class))
            .sum::<f64>();
        total / self.trees.len() as f64
    }
}

impl TryFrom<RawEnsemble> for TreeEnsemble {
    type Error = TreeError;

    fn try_from(raw: RawEnsemble) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.n_features, raw.n_classes, raw.trees)
    }
}

impl From<TreeEnsemble> for RawEnsemble {
    fn from(model: TreeEnsemble) -> Self {
        Self {
            name: model.name,
            n_features: model.n_features,
            n_classes: model.n_classes,
            trees: model.trees,
        }
    }
}

impl Classifier for TreeEnsemble {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_probability(&self, features: &[f64]) -> Vec<f64> {
        let mut acc = vec![0.0_f64; self.n_classes];
        for tree in &self.trees {
            for (slot, p) in acc.iter_mut().zip(tree.leaf_for(features)) {
                *slot += p;
            }
        }
        let count = self.trees.len() as f64;
        for slot in &mut acc {
            *slot /= count;
        }
        acc
    }

    fn explainer(&self) -> Option<&dyn Explainer> {
        Some(self)
    }
}
