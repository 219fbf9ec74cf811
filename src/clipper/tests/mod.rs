mod clipper_tests;
mod poly_tree_tests;
