use crate::geom::{NodeIndex, Point3, Triangle, triangulate_grid, triangulate_grid_wrapped};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn triangulate_grid_counts_and_bounds() {
    let (n_i, n_j) = (5, 4);
    let triangles = triangulate_grid(n_i, n_j);
    assert_eq!(triangles.len(), (n_i - 1) * (n_j - 1) * 2);
    assert!(
        triangles
            .iter()
            .flatten()
            .all(|&(i, j)| i < n_i && j < n_j)
    );
}

#[test]
fn cells_are_cut_along_the_main_diagonal() {
    let triangles = triangulate_grid(2, 2);
    let diagonal: [NodeIndex; 2] = [(0, 0), (1, 1)];
    assert_eq!(triangles.len(), 2);
    for t in &triangles {
        assert!(diagonal.iter().all(|node| t.contains(node)));
    }
}

#[test]
fn wrapped_grid_closes_the_first_axis() {
    let triangles = triangulate_grid_wrapped(6, 3, true);
    assert_eq!(triangles.len(), 6 * 2 * 2);
    let seam = triangles
        .iter()
        .filter(|t| t.contains(&(5, 0)) && t.contains(&(0, 1)))
        .count();
    assert_eq!(seam, 2);
}

#[test]
fn too_small_grids_give_no_triangles() {
    assert!(triangulate_grid(1, 5).is_empty());
    assert!(triangulate_grid_wrapped(2, 5, true).is_empty());
}

#[test]
fn right_triangle_area() {
    let t = Triangle::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(0.0, 4.0, 0.0),
    );
    assert_eq!(t.edge_lengths(), [3.0, 5.0, 4.0]);
    assert!(approx_eq(t.area().unwrap(), 6.0, 1e-12));
}
