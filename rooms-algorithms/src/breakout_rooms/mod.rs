pub mod seq_vnd;
