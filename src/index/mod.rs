pub mod posting;
pub mod skiplist;
pub mod source;
pub mod term_index;
