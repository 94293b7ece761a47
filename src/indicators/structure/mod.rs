pub mod pivot;
