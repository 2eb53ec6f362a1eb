//! Random data generation for stress testing and benchmarks.
