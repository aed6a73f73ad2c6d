mod test_coords_basic;
mod test_triangulation_basic;
