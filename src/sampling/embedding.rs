use crate::Count;
use crate::tree::tree::Tree;
use ndarray::Array2;
use ndarray::Axis;
use ndarray::s;

/// number of root-preserving embeddings of the observed tree into a
/// candidate: injective maps sending root to root and each child of an
/// observed node into a distinct child branch of its image. computed
/// as a dynamic program over same-depth node pairs, deepest level
/// first, so the depth of the trees never touches the call stack.
/// counts are exact whole numbers carried in f64.
pub fn embeddings(observation: &Tree, candidate: &Tree) -> Count {
    if observation.len() > candidate.len() {
        return 0.0;
    }
    let rows = observation.levels();
    let cols = candidate.levels();
    let mut counts = Array2::<Count>::zeros((observation.len(), candidate.len()));
    for (depth, sources) in rows.iter().enumerate().rev() {
        let Some(targets) = cols.get(depth) else {
            continue;
        };
        for s in sources {
            for g in targets {
                let below = s.children();
                let above = g.children();
                let count = if below.is_empty() {
                    1.0
                } else {
                    permanent(&Array2::from_shape_fn(
                        (below.len(), above.len()),
                        |(i, j)| {
                            counts[[below[i].index().index(), above[j].index().index()]]
                        },
                    ))
                };
                counts[[s.index().index(), g.index().index()]] = count;
            }
        }
    }
    counts[[0, 0]]
}

/// permanent of a rectangular weight matrix by first-row expansion,
/// skipping zero entries. no sign alternation: this is the permanent,
/// not the determinant. an empty matrix weighs 1; a single row sums;
/// more rows than columns vanishes through the empty row sum.
pub fn permanent(weights: &Array2<Count>) -> Count {
    match weights.nrows() {
        0 => 1.0,
        1 => weights.row(0).sum(),
        _ => weights
            .row(0)
            .iter()
            .enumerate()
            .filter(|(_, weight)| **weight != 0.0)
            .map(|(j, weight)| {
                let spared = (0..weights.ncols()).filter(|c| *c != j).collect::<Vec<_>>();
                weight * permanent(&weights.slice(s![1.., ..]).select(Axis(1), &spared))
            })
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::offspring::Offspring;
    use ndarray::arr2;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn path(length: usize) -> Tree {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let chain = Offspring::try_from(vec![1.0]).expect("unit mass");
        Tree::generate(&chain, length, rng)
    }

    fn binary(depth: usize) -> Tree {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let fork = Offspring::try_from(vec![0.0, 1.0]).expect("unit mass");
        Tree::generate(&fork, depth, rng)
    }

    #[test]
    fn permanent_of_empty_matrix_is_one() {
        assert!(permanent(&Array2::zeros((0, 0))) == 1.0);
        assert!(permanent(&Array2::zeros((0, 3))) == 1.0);
    }

    #[test]
    fn permanent_of_single_row_is_its_sum() {
        assert!(permanent(&arr2(&[[1.0, 2.0, 3.0]])) == 6.0);
        assert!(permanent(&arr2(&[[0.0; 0]; 1])) == 0.0);
    }

    #[test]
    fn permanent_of_square_matrix() {
        assert!(permanent(&arr2(&[[1.0, 2.0], [3.0, 4.0]])) == 10.0);
        assert!(permanent(&arr2(&[[1.0, 1.0], [1.0, 1.0]])) == 2.0);
        let m = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert!(permanent(&m) == 450.0);
    }

    #[test]
    fn permanent_of_wide_matrix_sums_injections() {
        assert!(permanent(&arr2(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]])) == 6.0);
    }

    #[test]
    fn permanent_of_tall_matrix_vanishes() {
        assert!(permanent(&arr2(&[[1.0], [1.0]])) == 0.0);
    }

    #[test]
    fn single_node_embeds_once() {
        assert!(embeddings(&Tree::default(), &binary(3)) == 1.0);
        assert!(embeddings(&Tree::default(), &Tree::default()) == 1.0);
    }

    #[test]
    fn path_embeds_into_itself_once() {
        let tree = path(3);
        assert!(embeddings(&tree, &tree) == 1.0);
    }

    #[test]
    fn symmetric_tree_counts_its_automorphisms() {
        let tree = binary(3);
        assert!(embeddings(&tree, &tree) == 8.0);
    }

    #[test]
    fn path_embeds_along_every_branch() {
        assert!(embeddings(&path(3), &binary(3)) == 4.0);
    }

    #[test]
    fn wider_observation_cannot_embed() {
        assert!(embeddings(&binary(3), &path(3)) == 0.0);
        assert!(embeddings(&path(4), &path(3)) == 0.0);
    }

    #[test]
    fn deeper_observation_cannot_embed() {
        assert!(embeddings(&path(4), &binary(4)) == 8.0);
        assert!(embeddings(&path(5), &binary(4)) == 0.0);
    }
}
