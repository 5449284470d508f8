mod product_normalizer_tests;
